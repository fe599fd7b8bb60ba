//! Structured documents over a block store.
//!
//! [`DagStore`] is the capability the access layer consumes: `put` a JSON
//! document and get back its [`Cid`], `get` a [`Cid`] and get the document
//! back. [`BlockDag`] implements it on top of any [`BlockStore`] using the
//! canonical serialization, so the identifier a node computes locally is the
//! same one every other node computes for the same document.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use crate::block::{BlockStore, MemoryBlockStore};
use crate::canonical::to_canonical_bytes;
use crate::cid::Cid;
use crate::error::{StorageError, StorageResult};

/// Content-addressed document storage.
#[async_trait]
pub trait DagStore: Send + Sync {
    /// Store a document and return its content identifier.
    async fn put(&self, document: &Value) -> StorageResult<Cid>;

    /// Fetch and decode the document stored under `cid`.
    ///
    /// Fails with [`StorageError::NotFound`] if it is absent.
    async fn get(&self, cid: &Cid) -> StorageResult<Value>;

    /// Check whether a document is present.
    async fn has(&self, cid: &Cid) -> StorageResult<bool>;
}

/// Compute the identifier a document would be stored under, without storing it.
///
/// # Errors
///
/// Returns an error if the document cannot be canonically serialized.
pub fn cid_of_document(document: &Value) -> StorageResult<Cid> {
    Ok(Cid::of(&to_canonical_bytes(document)?))
}

/// A [`DagStore`] backed by a [`BlockStore`].
#[derive(Clone)]
pub struct BlockDag {
    blocks: Arc<dyn BlockStore>,
}

impl BlockDag {
    /// Wrap an existing block store.
    #[must_use]
    pub fn new(blocks: Arc<dyn BlockStore>) -> Self {
        Self { blocks }
    }

    /// A DAG over a fresh in-memory block store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBlockStore::new()))
    }

    /// The underlying block store.
    #[must_use]
    pub fn blocks(&self) -> &Arc<dyn BlockStore> {
        &self.blocks
    }
}

impl std::fmt::Debug for BlockDag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockDag").finish_non_exhaustive()
    }
}

#[async_trait]
impl DagStore for BlockDag {
    async fn put(&self, document: &Value) -> StorageResult<Cid> {
        let bytes = to_canonical_bytes(document)?;
        let cid = Cid::of(&bytes);
        trace!(%cid, size = bytes.len(), "dag put");
        self.blocks.put(cid, bytes).await?;
        Ok(cid)
    }

    async fn get(&self, cid: &Cid) -> StorageResult<Value> {
        let bytes = self
            .blocks
            .get(cid)
            .await?
            .ok_or(StorageError::NotFound(*cid))?;

        let actual = Cid::of(&bytes);
        if actual != *cid {
            return Err(StorageError::Corrupt {
                expected: *cid,
                actual,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn has(&self, cid: &Cid) -> StorageResult<bool> {
        self.blocks.contains(cid).await
    }
}
