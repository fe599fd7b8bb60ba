//! TallyLab Crypto - signing keys and content hashes.
//!
//! This crate provides:
//! - Ed25519 key pairs, random or derived from a 32-byte seed
//! - Detached signatures used to cross-sign identities
//! - BLAKE3 content hashes backing content identifiers
//!
//! # Example
//!
//! ```
//! use tallylab_crypto::{ContentHash, KeyPair};
//!
//! let keypair = KeyPair::from_seed(b"thisisexactlythirtytwocharacters").unwrap();
//!
//! let signature = keypair.sign(b"entry");
//! assert!(keypair.verify(b"entry", &signature).is_ok());
//!
//! let hash = ContentHash::hash(b"entry");
//! assert_eq!(hash.to_hex().len(), 64);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod hash;
mod keypair;
mod signature;

pub use error::{CryptoError, CryptoResult};
pub use hash::ContentHash;
pub use keypair::{KeyPair, PublicKey};
pub use signature::Signature;
