//! The node context an access controller is bound to.

use std::sync::Arc;

use tallylab_identity::{Identity, IdentityVerifier};
use tallylab_storage::DagStore;

/// What a running node lends to the controllers it creates: its own
/// identity, the capability that verifies identities, and the
/// content-addressed store policies and manifests live in.
#[derive(Clone)]
pub struct NodeContext {
    /// The node's own identity.
    pub identity: Identity,
    /// Identity verification and local key lookup.
    pub verifier: Arc<dyn IdentityVerifier>,
    /// Content-addressed document store.
    pub dag: Arc<dyn DagStore>,
}

impl NodeContext {
    /// Assemble a node context.
    #[must_use]
    pub fn new(
        identity: Identity,
        verifier: Arc<dyn IdentityVerifier>,
        dag: Arc<dyn DagStore>,
    ) -> Self {
        Self {
            identity,
            verifier,
            dag,
        }
    }
}

impl std::fmt::Debug for NodeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeContext")
            .field("identity", &self.identity.short_id())
            .finish_non_exhaustive()
    }
}
