//! Prelude module - commonly used types for convenient import.
//!
//! Use `use tallylab_crypto::prelude::*;` to import all essential types.

// Errors
pub use crate::{CryptoError, CryptoResult};

// Keys
pub use crate::{KeyPair, PublicKey};

// Signature
pub use crate::Signature;

// Hashing
pub use crate::ContentHash;
