//! Prelude module - commonly used types for convenient import.
//!
//! Use `use tallylab_identity::prelude::*;` to import all essential types.

// Errors
pub use crate::{IdentityError, IdentityResult};

// Identities
pub use crate::{Identity, IdentitySignatures};

// Keys and verification
pub use crate::{IdentityVerifier, Keystore, TallyLabIdentityProvider};
