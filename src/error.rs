//! Error types for the storefront cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Storage Error Enum ==
/// Faults raised by a persistent key/value backend.
///
/// These never escape `TtlCache`: the cache logs them and falls back to a
/// miss or a `false` return.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying file or device failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Write rejected because the backend is out of space
    #[error("Storage quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Backend refused the operation
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// == Fetch Error Enum ==
/// Faults on the network path. Propagated unchanged to callers.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, timeout or protocol failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {path}")]
    Status { status: u16, path: String },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    /// Request parameters could not be serialized
    #[error("Invalid request parameters: {0}")]
    InvalidParams(String),

    /// Base URL and path did not form a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

// == Result Type Aliases ==
/// Convenience Result type for storage backends.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Convenience Result type for network-backed reads and writes.
pub type Result<T> = std::result::Result<T, FetchError>;
