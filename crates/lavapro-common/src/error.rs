//! Error types shared across Lava Rapido Pro crates

use thiserror::Error;

/// Persistence collaborator failure
///
/// Always fatal to the operation that triggered it; callers propagate with `?`
/// and never retry.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying file or device failure
    #[error("IO error on key {key}: {source}")]
    Io {
        /// Storage key being accessed
        key: String,
        /// Cause
        #[source]
        source: std::io::Error,
    },

    /// Stored value could not be encoded or decoded
    #[error("serialization error on key {key}: {source}")]
    Serialization {
        /// Storage key being accessed
        key: String,
        /// Cause
        #[source]
        source: serde_json::Error,
    },

    /// Backend-specific failure
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for persistence calls
pub type StorageResult<T> = Result<T, StorageError>;

/// Messaging link construction failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    /// Contact handle has no digits to dial
    #[error("contact handle has no digits: {0:?}")]
    NoDigits(String),
}
