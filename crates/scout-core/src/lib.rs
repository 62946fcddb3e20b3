//! Core types for the Scout tender discovery engine.
//!
//! This crate contains shared data structures used across all Scout crates:
//! - Tender records and their industry/province enumerations
//! - Filter criteria and view modes
//! - Clock abstraction
//! - Configuration types
//! - Error types

mod clock;
mod config;
mod criteria;
mod error;
mod tender;
mod view_mode;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    config_dir, config_path, data_dir, EngineConfig, MAX_URGENT_WINDOW_DAYS, PAGE_SIZE,
    SAVED_TENDERS_KEY,
};
pub use criteria::{FilterCriteria, ProvinceFilter};
pub use error::{ConfigError, GatewayError, StorageError};
pub use tender::{
    urgent_window, IndustryCategory, Province, Tender, TenderId, UnknownTag, URGENT_WINDOW_DAYS,
};
pub use view_mode::ViewMode;
