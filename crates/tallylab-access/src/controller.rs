//! The access decision engine.

use std::sync::Arc;

use async_trait::async_trait;
use tallylab_identity::{Identity, IdentityVerifier};
use tallylab_storage::Cid;
use tracing::{debug, trace};

use crate::decision::{AccessDecision, Denial};
use crate::entry::LogEntry;
use crate::error::AccessResult;
use crate::node::NodeContext;
use crate::params::{PolicyParams, TALLYLAB_CONTROLLER_TYPE};
use crate::policy_store::PolicyStore;

/// A controller bound to a node, deciding which entries may be appended.
///
/// Implementations are immutable once created. Decisions are pure functions
/// of the entry, the bound node identity and the policy parameters, so a
/// single controller can evaluate any number of entries concurrently.
#[async_trait]
pub trait AccessController: Send + Sync {
    /// The controller kind discriminator.
    fn controller_type(&self) -> &str;

    /// The policy this controller enforces.
    fn params(&self) -> &PolicyParams;

    /// Evaluate `entry` and report which check, if any, refused it.
    ///
    /// # Errors
    ///
    /// Returns an error if `verifier` fails. That is not a decision and must
    /// not be treated as one.
    async fn evaluate(
        &self,
        entry: &LogEntry,
        verifier: &dyn IdentityVerifier,
    ) -> AccessResult<AccessDecision>;

    /// Check whether `entry` may be appended.
    ///
    /// Every denial collapses to `Ok(false)`; use [`evaluate`] to see which
    /// check refused.
    ///
    /// # Errors
    ///
    /// Returns an error if `verifier` fails.
    ///
    /// [`evaluate`]: AccessController::evaluate
    async fn can_append(
        &self,
        entry: &LogEntry,
        verifier: &dyn IdentityVerifier,
    ) -> AccessResult<bool> {
        Ok(self.evaluate(entry, verifier).await?.is_allowed())
    }

    /// Persist the policy and return its content identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy cannot be stored.
    async fn save(&self) -> AccessResult<Cid>;
}

/// Grants write access to identities whose signing key is in the write-set
/// and held by this node.
pub struct TallyLabAccessController {
    params: Arc<PolicyParams>,
    identity: Identity,
    store: PolicyStore,
}

impl TallyLabAccessController {
    /// Bind `params` to `node`.
    #[must_use]
    pub fn new(node: &NodeContext, params: PolicyParams) -> Self {
        Self {
            params: Arc::new(params),
            identity: node.identity.clone(),
            store: PolicyStore::new(Arc::clone(&node.dag)),
        }
    }

    /// Load the policy stored at `address` and bind it to `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy cannot be found or decoded.
    pub async fn load(node: &NodeContext, address: &str) -> AccessResult<Self> {
        let params = PolicyStore::new(Arc::clone(&node.dag)).load(address).await?;
        Ok(Self::new(node, params))
    }

    /// The node identity this controller is bound to.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Check whether `entry_identity` is this node's own identity.
    ///
    /// This restricts the controller to validating writes that originate
    /// locally. Relaxing it turns the controller into a multi-writer one.
    #[must_use]
    pub fn is_local_origin(&self, entry_identity: &Identity) -> bool {
        self.identity.id == entry_identity.id
    }
}

impl std::fmt::Debug for TallyLabAccessController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TallyLabAccessController")
            .field("params", &self.params)
            .field("identity", &self.identity.short_id())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AccessController for TallyLabAccessController {
    fn controller_type(&self) -> &str {
        TALLYLAB_CONTROLLER_TYPE
    }

    fn params(&self) -> &PolicyParams {
        &self.params
    }

    #[tracing::instrument(
        name = "access.evaluate",
        skip_all,
        fields(controller = TALLYLAB_CONTROLLER_TYPE, db = %self.params.name())
    )]
    async fn evaluate(
        &self,
        entry: &LogEntry,
        verifier: &dyn IdentityVerifier,
    ) -> AccessResult<AccessDecision> {
        let decision = self.check(entry, verifier).await?;
        match decision {
            AccessDecision::Allow => {
                trace!(writer = entry.writer_id().unwrap_or_default(), "append allowed");
            },
            AccessDecision::Deny(denial) => {
                debug!(
                    writer = entry.writer_id().unwrap_or("<none>"),
                    reason = denial.as_str(),
                    "append denied"
                );
            },
        }
        Ok(decision)
    }

    async fn save(&self) -> AccessResult<Cid> {
        self.store.save(&self.params).await
    }
}

impl TallyLabAccessController {
    async fn check(
        &self,
        entry: &LogEntry,
        verifier: &dyn IdentityVerifier,
    ) -> AccessResult<AccessDecision> {
        let Some(entry_identity) = entry.identity.as_ref() else {
            return Ok(AccessDecision::Deny(Denial::VerificationFailure));
        };

        if !verifier.verify_identity(entry_identity).await? {
            return Ok(AccessDecision::Deny(Denial::VerificationFailure));
        }
        if !self.is_local_origin(entry_identity) {
            return Ok(AccessDecision::Deny(Denial::ForeignOrigin));
        }
        if !self.params.allows_writer(&self.identity.id) {
            return Ok(AccessDecision::Deny(Denial::UnauthorizedWriter));
        }
        if !verifier.has_local_key(&entry_identity.id).await? {
            return Ok(AccessDecision::Deny(Denial::KeyNotLocallyHeld));
        }

        Ok(AccessDecision::Allow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tallylab_crypto::KeyPair;
    use tallylab_identity::{Keystore, TallyLabIdentityProvider};
    use tallylab_storage::BlockDag;

    struct Fixture {
        provider: Arc<TallyLabIdentityProvider>,
        node: NodeContext,
    }

    fn fixture() -> Fixture {
        let provider = Arc::new(TallyLabIdentityProvider::new(Arc::new(
            Keystore::in_memory(),
        )));
        let identity = provider.create_identity(&KeyPair::generate()).unwrap();
        let node = NodeContext::new(
            identity,
            provider.clone(),
            Arc::new(BlockDag::in_memory()),
        );
        Fixture { provider, node }
    }

    #[tokio::test]
    async fn test_own_authorized_entry_is_allowed() {
        let fx = fixture();
        let controller = TallyLabAccessController::new(
            &fx.node,
            PolicyParams::new("root", [fx.node.identity.id.clone()]),
        );
        let entry = LogEntry::new(fx.node.identity.clone(), json!({ "op": "PUT" }));

        assert_eq!(
            controller.evaluate(&entry, fx.provider.as_ref()).await.unwrap(),
            AccessDecision::Allow
        );
        assert!(controller.can_append(&entry, fx.provider.as_ref()).await.unwrap());
    }

    #[tokio::test]
    async fn test_entry_without_identity_fails_verification() {
        let fx = fixture();
        let controller = TallyLabAccessController::new(
            &fx.node,
            PolicyParams::new("root", [fx.node.identity.id.clone()]),
        );
        let entry = LogEntry {
            identity: None,
            payload: json!(null),
        };

        assert_eq!(
            controller.evaluate(&entry, fx.provider.as_ref()).await.unwrap(),
            AccessDecision::Deny(Denial::VerificationFailure)
        );
        assert!(!controller.can_append(&entry, fx.provider.as_ref()).await.unwrap());
    }

    #[tokio::test]
    async fn test_unlisted_node_is_unauthorized() {
        let fx = fixture();
        let controller =
            TallyLabAccessController::new(&fx.node, PolicyParams::new("root", ["someone-else"]));
        let entry = LogEntry::new(fx.node.identity.clone(), json!({}));

        assert_eq!(
            controller.evaluate(&entry, fx.provider.as_ref()).await.unwrap(),
            AccessDecision::Deny(Denial::UnauthorizedWriter)
        );
    }

    #[tokio::test]
    async fn test_save_then_load_binds_same_policy() {
        let fx = fixture();
        let params = PolicyParams::new("root", [fx.node.identity.id.clone()]);
        let controller = TallyLabAccessController::new(&fx.node, params.clone());

        let cid = controller.save().await.unwrap();
        let loaded = TallyLabAccessController::load(&fx.node, &cid.to_reference())
            .await
            .unwrap();
        assert_eq!(loaded.params(), &params);
        assert_eq!(loaded.identity().id, fx.node.identity.id);
    }
}
