//! Access control error types.

use tallylab_identity::IdentityError;
use tallylab_storage::StorageError;

use crate::decision::Denial;

/// Errors that can occur while loading, saving or enforcing access policy.
///
/// A denied entry is not an error for [`can_append`]: denials are reported
/// as `Ok(false)`. These variants cover failures that prevent a decision or
/// an operation that was refused outright.
///
/// [`can_append`]: crate::AccessController::can_append
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The requested content identifier is not in the store.
    #[error("not found: {address}")]
    NotFound {
        /// The address that was looked up.
        address: String,
    },

    /// A stored document does not have the shape of policy parameters.
    #[error("malformed policy: {0}")]
    MalformedPolicy(String),

    /// A stored document does not have the shape of a database manifest.
    #[error("malformed manifest: {0}")]
    MalformedManifest(String),

    /// A policy or database address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// No controller kind is registered for the requested type.
    #[error("unknown access controller type: {0}")]
    UnknownControllerType(String),

    /// A controller kind with the same type is already registered.
    #[error("access controller type already registered: {0}")]
    AlreadyRegistered(String),

    /// An append was refused by the access controller.
    #[error("write denied for {writer}: {denial}")]
    WriteDenied {
        /// Id of the identity that attempted the write.
        writer: String,
        /// The check that refused it.
        denial: Denial,
    },

    /// The content-addressed store failed.
    #[error("storage error: {0}")]
    Storage(StorageError),

    /// The identity verifier or keystore failed.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<StorageError> for AccessError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(cid) => Self::NotFound {
                address: cid.to_string(),
            },
            StorageError::InvalidCid(address) => Self::InvalidAddress(address),
            other => Self::Storage(other),
        }
    }
}

/// Result type for access control operations.
pub type AccessResult<T> = Result<T, AccessError>;
