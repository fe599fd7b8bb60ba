//! TallyLab Identity - identities bound to Ed25519 signing keys.
//!
//! This crate provides:
//! - [`Identity`], the record every log entry carries
//! - [`Keystore`], the node-local store of keystore keys
//! - [`IdentityVerifier`], the contract the access layer checks entries with
//! - [`TallyLabIdentityProvider`], which issues and verifies identities
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tallylab_identity::{Keystore, TallyLabIdentityProvider};
//!
//! let provider = TallyLabIdentityProvider::new(Arc::new(Keystore::in_memory()));
//! let key = TallyLabIdentityProvider::keygen(Some(b"thisisexactlythirtytwocharacters")).unwrap();
//! let identity = provider.create_identity(&key).unwrap();
//!
//! assert!(TallyLabIdentityProvider::verify_signatures(&identity));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod identity;
mod keystore;
mod provider;

pub use error::{IdentityError, IdentityResult};
pub use identity::{Identity, IdentitySignatures, TALLYLAB_IDENTITY_TYPE};
pub use keystore::Keystore;
pub use provider::{IdentityVerifier, TallyLabIdentityProvider};
