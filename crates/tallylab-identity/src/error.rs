//! Identity error types.

use thiserror::Error;

/// Errors that can occur while issuing identities or consulting the keystore.
///
/// A signature that does not verify is not an error: verification reports it
/// as `Ok(false)`. These variants cover failures that prevent an answer.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Underlying cryptographic failure (bad seed, unreadable key file).
    #[error("crypto error: {0}")]
    Crypto(#[from] tallylab_crypto::CryptoError),

    /// Keystore backend failure.
    #[error("keystore error: {0}")]
    Keystore(String),

    /// A key name that cannot be used as a keystore entry.
    #[error("invalid key name: {0:?}")]
    InvalidKeyName(String),

    /// No keystore key exists for the requested name.
    #[error("no keystore key for {0}")]
    KeyNotFound(String),
}

/// Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;
