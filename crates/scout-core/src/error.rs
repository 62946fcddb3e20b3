//! Error types for the Scout engine.

use std::time::Duration;
use thiserror::Error;

/// Tender source errors. Every variant means the query failed and can be
/// retried; none of them are fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Request never reached the source or the connection dropped.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Source answered with an error status.
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// No answer within the configured deadline.
    #[error("Query timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Response body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Durable client storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage backend cannot be used at all.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted value could not be parsed.
    #[error("Corrupt value under '{key}': {message}")]
    Corrupt { key: String, message: String },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No config directory found.
    #[error("Config directory not found")]
    NoConfigDir,

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value was out of range.
    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },
}
