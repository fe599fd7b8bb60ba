//! Raw block stores.
//!
//! A block is an immutable byte string named by its [`Cid`]. Implementations:
//!
//! - [`MemoryBlockStore`] for tests and ephemeral nodes
//! - [`FsBlockStore`] for a node-local directory with a two-level fan-out

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{debug, error};

use crate::cid::Cid;
use crate::error::{StorageError, StorageResult};

/// Byte-level content-addressed storage.
///
/// `put` followed by `get` of the same block on the same node must be
/// immediately visible.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Store a block under its identifier. Storing an existing block is a no-op.
    async fn put(&self, cid: Cid, bytes: Vec<u8>) -> StorageResult<()>;

    /// Fetch a block. Returns `None` if it is absent.
    async fn get(&self, cid: &Cid) -> StorageResult<Option<Vec<u8>>>;

    /// Check whether a block is present.
    async fn contains(&self, cid: &Cid) -> StorageResult<bool>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// In-memory block store.
#[derive(Debug, Default)]
pub struct MemoryBlockStore {
    blocks: RwLock<HashMap<Cid, Vec<u8>>>,
}

impl MemoryBlockStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn put(&self, cid: Cid, bytes: Vec<u8>) -> StorageResult<()> {
        let mut blocks = self
            .blocks
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        blocks.entry(cid).or_insert(bytes);
        Ok(())
    }

    async fn get(&self, cid: &Cid) -> StorageResult<Option<Vec<u8>>> {
        let blocks = self
            .blocks
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(blocks.get(cid).cloned())
    }

    async fn contains(&self, cid: &Cid) -> StorageResult<bool> {
        let blocks = self
            .blocks
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))?;
        Ok(blocks.contains_key(cid))
    }
}

// ---------------------------------------------------------------------------
// Filesystem implementation
// ---------------------------------------------------------------------------

/// Filesystem block store.
///
/// Each block lives at `{base_dir}/{cid[0..2]}/{cid[2..4]}/{cid}`. Every
/// write goes to its own temporary file in the block's directory and is
/// renamed into place, so concurrent writers of one block never share a
/// file. Every read re-hashes the block before returning it.
#[derive(Debug)]
pub struct FsBlockStore {
    base_dir: PathBuf,
}

impl FsBlockStore {
    /// Open a store rooted at `base_dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(base_dir: impl AsRef<Path>) -> StorageResult<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// The root directory of this store.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn block_path(&self, cid: &Cid) -> PathBuf {
        let hex = cid.to_string();
        self.base_dir.join(&hex[0..2]).join(&hex[2..4]).join(&hex)
    }
}

#[async_trait]
impl BlockStore for FsBlockStore {
    async fn put(&self, cid: Cid, bytes: Vec<u8>) -> StorageResult<()> {
        let path = self.block_path(&cid);
        if tokio::fs::try_exists(&path).await? {
            return Ok(());
        }

        let size = bytes.len();
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_block(&target, &bytes))
            .await
            .map_err(|e| StorageError::Internal(format!("block write task failed: {e}")))??;

        debug!(%cid, path = %path.display(), size, "stored block");
        Ok(())
    }

    async fn get(&self, cid: &Cid) -> StorageResult<Option<Vec<u8>>> {
        let path = self.block_path(cid);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let actual = Cid::of(&bytes);
                if actual != *cid {
                    error!(expected = %cid, %actual, "block corruption detected on read");
                    return Err(StorageError::Corrupt {
                        expected: *cid,
                        actual,
                    });
                }
                Ok(Some(bytes))
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn contains(&self, cid: &Cid) -> StorageResult<bool> {
        Ok(tokio::fs::try_exists(self.block_path(cid)).await?)
    }
}

/// Write `bytes` to `path` through a uniquely named sibling temp file.
///
/// Losing a rename race to another writer is success: the block is content
/// addressed, so whatever is at `path` holds the same bytes.
fn write_block(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| StorageError::Internal(format!("{} has no parent", path.display())))?;
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    match tmp.persist(path) {
        Ok(_) => Ok(()),
        Err(_) if path.exists() => Ok(()),
        Err(e) => Err(StorageError::Io(e.error)),
    }
}
