//! The local node assembled from configuration.

use std::sync::Arc;

use anyhow::Context;
use tallylab_access::{ControllerRegistry, NodeContext};
use tallylab_config::{Config, StorageBackend};
use tallylab_crypto::KeyPair;
use tallylab_identity::{Identity, IdentityVerifier, Keystore, TallyLabIdentityProvider};
use tallylab_storage::{BlockDag, BlockStore, DagStore, FsBlockStore, MemoryBlockStore};
use tracing::debug;

/// Keystore, identity and block store of this machine.
pub(crate) struct LocalNode {
    pub(crate) provider: Arc<TallyLabIdentityProvider>,
    pub(crate) identity: Identity,
    pub(crate) dag: Arc<BlockDag>,
    pub(crate) registry: ControllerRegistry,
}

impl LocalNode {
    /// Open the node described by `config`, creating its key on first use.
    pub(crate) fn open(config: &Config) -> anyhow::Result<Self> {
        let signing_key = match config.identity_key_path() {
            Some(path) => KeyPair::load_or_generate(&path)
                .with_context(|| format!("failed to load identity key {}", path.display()))?,
            None => KeyPair::generate(),
        };
        Self::with_signing_key(config, &signing_key)
    }

    /// Open the node with an explicit identity signing key.
    pub(crate) fn with_signing_key(config: &Config, signing_key: &KeyPair) -> anyhow::Result<Self> {
        let keystore = match config.keystore_dir() {
            Some(dir) => Keystore::open(&dir)
                .with_context(|| format!("failed to open keystore {}", dir.display()))?,
            None => Keystore::in_memory(),
        };
        let provider = Arc::new(TallyLabIdentityProvider::new(Arc::new(keystore)));
        let identity = provider.create_identity(signing_key)?;

        let blocks: Arc<dyn BlockStore> = match (config.storage.backend, config.blocks_dir()) {
            (StorageBackend::Fs, Some(dir)) => Arc::new(
                FsBlockStore::open(&dir)
                    .with_context(|| format!("failed to open block store {}", dir.display()))?,
            ),
            (StorageBackend::Fs, None) => anyhow::bail!("the fs backend needs a directory"),
            (StorageBackend::Memory, _) => Arc::new(MemoryBlockStore::new()),
        };

        debug!(
            id = identity.short_id(),
            backend = %config.storage.backend,
            "opened local node"
        );

        Ok(Self {
            provider,
            identity,
            dag: Arc::new(BlockDag::new(blocks)),
            registry: ControllerRegistry::with_defaults(),
        })
    }

    /// The context controllers bind to.
    pub(crate) fn context(&self) -> NodeContext {
        NodeContext::new(
            self.identity.clone(),
            Arc::clone(&self.provider) as Arc<dyn IdentityVerifier>,
            Arc::clone(&self.dag) as Arc<dyn DagStore>,
        )
    }

    /// The node's identity verifier.
    pub(crate) fn verifier(&self) -> &dyn IdentityVerifier {
        self.provider.as_ref()
    }
}
