//! Test fixtures for nodes, identities and entries.

use std::sync::Arc;

use serde_json::{Value, json};
use tallylab_access::{LogEntry, NodeContext, PolicyParams, TallyLabAccessController};
use tallylab_crypto::KeyPair;
use tallylab_identity::{Identity, IdentityVerifier, Keystore, TallyLabIdentityProvider};
use tallylab_storage::BlockDag;

/// The 32-byte seed used for deterministic test identities.
pub const TEST_SEED: &[u8; 32] = b"thisisexactlythirtytwocharacters";

/// Install a test-friendly tracing subscriber. Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// A node with its own keystore, identity and in-memory store.
#[derive(Debug, Clone)]
pub struct TestNode {
    /// Identity provider over the node's keystore.
    pub provider: Arc<TallyLabIdentityProvider>,
    /// The node's own identity.
    pub identity: Identity,
    /// The node's content-addressed store.
    pub dag: Arc<BlockDag>,
}

impl TestNode {
    /// A node with a random identity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_key(&KeyPair::generate(), Arc::new(BlockDag::in_memory()))
    }

    /// A node whose identity is derived from `seed`.
    ///
    /// # Panics
    ///
    /// Panics if `seed` is not 32 bytes.
    #[must_use]
    pub fn from_seed(seed: &[u8]) -> Self {
        let key = TallyLabIdentityProvider::keygen(Some(seed)).expect("valid test seed");
        Self::with_key(&key, Arc::new(BlockDag::in_memory()))
    }

    /// A node with a random identity sharing `dag` with other nodes.
    #[must_use]
    pub fn sharing(dag: Arc<BlockDag>) -> Self {
        Self::with_key(&KeyPair::generate(), dag)
    }

    /// A node whose identity is issued for `signing_key`.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory keystore fails.
    #[must_use]
    pub fn with_key(signing_key: &KeyPair, dag: Arc<BlockDag>) -> Self {
        let provider = Arc::new(TallyLabIdentityProvider::new(Arc::new(
            Keystore::in_memory(),
        )));
        let identity = provider
            .create_identity(signing_key)
            .expect("issue test identity");
        Self {
            provider,
            identity,
            dag,
        }
    }

    /// Issue another identity whose keystore key lives on this node.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory keystore fails.
    #[must_use]
    pub fn issue_local_identity(&self) -> Identity {
        self.provider
            .create_identity(&KeyPair::generate())
            .expect("issue local identity")
    }

    /// The node's verifier.
    #[must_use]
    pub fn verifier(&self) -> &dyn IdentityVerifier {
        self.provider.as_ref()
    }

    /// The node context controllers bind to.
    #[must_use]
    pub fn context(&self) -> NodeContext {
        NodeContext::new(
            self.identity.clone(),
            Arc::clone(&self.provider) as Arc<dyn IdentityVerifier>,
            Arc::clone(&self.dag) as Arc<dyn tallylab_storage::DagStore>,
        )
    }

    /// A TallyLab controller over the `root` database with `write` as its writers.
    #[must_use]
    pub fn controller<I, S>(&self, write: I) -> TallyLabAccessController
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TallyLabAccessController::new(&self.context(), PolicyParams::new("root", write))
    }
}

impl Default for TestNode {
    fn default() -> Self {
        Self::new()
    }
}

/// An identity issued by a fresh, unrelated node.
#[must_use]
pub fn unrelated_identity() -> Identity {
    TestNode::new().identity
}

/// A key-value `PUT` entry written by `identity`.
#[must_use]
pub fn test_entry(identity: &Identity) -> LogEntry {
    LogEntry::new(identity.clone(), test_payload())
}

/// The payload used by [`test_entry`].
#[must_use]
pub fn test_payload() -> Value {
    json!({ "op": "PUT", "key": "foo", "value": "bar" })
}
