//! Storage error types.

use crate::cid::Cid;

/// Errors from storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No block is stored under the requested content identifier.
    #[error("not found: {0}")]
    NotFound(Cid),

    /// A stored block no longer hashes to its content identifier.
    #[error("corrupt block: expected {expected}, got {actual}")]
    Corrupt {
        /// The identifier the block was stored under.
        expected: Cid,
        /// The identifier its bytes actually hash to.
        actual: Cid,
    },

    /// A string is not a valid content identifier or reference.
    #[error("invalid content identifier: {0}")]
    InvalidCid(String),

    /// The document cannot be serialized canonically.
    #[error("non-canonical document: {0}")]
    NonCanonical(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A storage operation failed.
    #[error("storage error: {0}")]
    Internal(String),

    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
