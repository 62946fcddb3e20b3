//! Durable client storage for the Scout engine.
//!
//! This crate provides:
//! - The [`DurableStore`] key/value contract and two implementations
//! - The [`SavedTenderRegistry`] bookmark set built on top of it

mod registry;
mod store;

pub use registry::{SavedTenderRegistry, StorageWarning};
pub use store::{DurableStore, FileStore, MemoryStore};
