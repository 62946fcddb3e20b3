//! Tender discovery engine.
//!
//! This crate composes the Scout building blocks into the engine behind the
//! tender view:
//! - Filter criteria and pagination driving gateway queries
//! - View modes narrowing the fetched page
//! - Summary statistics over the fetched page
//! - Request sequencing so stale responses never win
//!
//! All types are toolkit-independent; a UI subscribes to [`EngineSnapshot`]s
//! and renders [`TenderView`].

pub mod engine;
pub mod pagination;
pub mod selector;
pub mod state;
pub mod stats;

// Re-export commonly used types
pub use engine::{FetchTask, TenderEngine};
pub use pagination::Pagination;
pub use selector::{apply_view_mode, EmptyReason};
pub use state::{EngineSnapshot, FetchOutcome, TenderView};
pub use stats::{aggregate, StatsScope, StatsSnapshot};

// Re-export scout_core types for convenience
pub use scout_core::{
    EngineConfig, FilterCriteria, IndustryCategory, Province, ProvinceFilter, Tender, TenderId,
    ViewMode,
};
