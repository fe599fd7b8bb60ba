//! TallyLab Test - shared test utilities.
//!
//! This crate provides fixtures and mock collaborators used across the
//! TallyLab crates as a dev-dependency.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! tallylab-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use tallylab_test::{TestNode, test_entry};
//!
//! #[tokio::test]
//! async fn owner_can_write() {
//!     let node = TestNode::new();
//!     let controller = node.controller([node.identity.id.clone()]);
//!     let entry = test_entry(&node.identity);
//!     assert!(controller.can_append(&entry, node.verifier()).await.unwrap());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
