//! TallyLab Access - write access control for content-addressed databases.
//!
//! An access controller decides, for every entry a node tries to append,
//! whether that entry may join the log. Its policy is itself a
//! content-addressed document, and the database address is derived from the
//! policy's identifier. The same name, type and writer set therefore always
//! yield the same address on every node.
//!
//! # Components
//!
//! - [`PolicyParams`] and [`PolicyStore`]: the persisted policy
//! - [`TallyLabAccessController`]: the four-check decision engine
//! - [`ControllerRegistry`]: controller kinds keyed by type
//! - [`derive_address`], [`create_database`], [`open_database`]: addressing
//!
//! # Example
//!
//! ```
//! use tallylab_access::{PolicyParams, derive_address};
//!
//! let params = PolicyParams::new("root", ["idA"]);
//! let derived = derive_address(&params, "keyvalue").unwrap();
//! assert_eq!(
//!     derived.policy.to_string(),
//!     "fbeddc8bd3fc5820e34a841c74d6fe5b3c7ce2d4fce37bcbcb20252828202fa2"
//! );
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod address;
pub mod controller;
pub mod database;
pub mod decision;
pub mod entry;
/// Error types and results for access control.
pub mod error;
pub mod node;
pub mod params;
pub mod policy_store;
pub mod registry;

pub use address::{ADDRESS_PREFIX, DatabaseAddress, DerivedAddress, Manifest, derive_address};
pub use controller::{AccessController, TallyLabAccessController};
pub use database::{Database, create_database, open_database};
pub use decision::{AccessDecision, Denial};
pub use entry::LogEntry;
pub use error::{AccessError, AccessResult};
pub use node::NodeContext;
pub use params::{ControllerOptions, PolicyParams, TALLYLAB_CONTROLLER_TYPE};
pub use policy_store::PolicyStore;
pub use registry::{ControllerKind, ControllerRegistry, TallyLabKind};
