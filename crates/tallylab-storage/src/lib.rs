//! TallyLab Storage - content-addressed persistence.
//!
//! Provides two tiers of storage for a TallyLab node:
//!
//! # Tier 1: Blocks ([`BlockStore`])
//!
//! Immutable byte strings named by their [`Cid`]. [`MemoryBlockStore`] keeps
//! them in a map; [`FsBlockStore`] keeps them in a fan-out directory and
//! re-hashes every block on read.
//!
//! # Tier 2: Documents ([`DagStore`])
//!
//! JSON documents stored as blocks of their canonical bytes. This is the
//! `dagPut` / `dagGet` capability policy and manifest persistence is built on.
//!
//! # Example
//!
//! ```
//! use tallylab_storage::{BlockDag, DagStore};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let dag = BlockDag::in_memory();
//! let cid = dag.put(&serde_json::json!({ "name": "root" })).await.unwrap();
//! assert_eq!(dag.get(&cid).await.unwrap()["name"], "root");
//! # });
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod block;
pub mod canonical;
pub mod cid;
pub mod dag;
pub mod error;

pub use block::{BlockStore, FsBlockStore, MemoryBlockStore};
pub use canonical::{canonicalize, to_canonical_bytes};
pub use cid::{CID_SCHEME, Cid};
pub use dag::{BlockDag, DagStore, cid_of_document};
pub use error::{StorageError, StorageResult};
