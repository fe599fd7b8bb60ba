//! Persistence of policy parameters in the content-addressed store.
//!
//! `save` and `load` are the only places the access layer touches storage.
//! Saving is deterministic: the document is written in canonical form, so
//! equal parameters always land at the same [`Cid`].

use std::sync::Arc;

use tallylab_storage::{Cid, DagStore};
use tracing::debug;

use crate::error::AccessResult;
use crate::params::PolicyParams;

/// Saves and loads [`PolicyParams`] through a [`DagStore`].
#[derive(Clone)]
pub struct PolicyStore {
    dag: Arc<dyn DagStore>,
}

impl PolicyStore {
    /// Create a policy store over `dag`.
    #[must_use]
    pub fn new(dag: Arc<dyn DagStore>) -> Self {
        Self { dag }
    }

    /// Persist `params` and return their content identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be encoded or stored.
    pub async fn save(&self, params: &PolicyParams) -> AccessResult<Cid> {
        let cid = self.dag.put(&params.to_document()?).await?;
        debug!(%cid, name = params.name(), writers = params.write().len(), "saved policy");
        Ok(cid)
    }

    /// Load the parameters stored at `address`.
    ///
    /// `address` may be a bare identifier or a `/dag/<cid>` reference.
    ///
    /// # Errors
    ///
    /// - [`AccessError::InvalidAddress`] if `address` does not parse
    /// - [`AccessError::NotFound`] if nothing is stored there
    /// - [`AccessError::MalformedPolicy`] if the document has the wrong shape
    ///
    /// [`AccessError::InvalidAddress`]: crate::AccessError::InvalidAddress
    /// [`AccessError::NotFound`]: crate::AccessError::NotFound
    /// [`AccessError::MalformedPolicy`]: crate::AccessError::MalformedPolicy
    pub async fn load(&self, address: &str) -> AccessResult<PolicyParams> {
        let cid = Cid::from_reference(address)?;
        self.load_cid(&cid).await
    }

    /// Load the parameters stored under `cid`.
    ///
    /// # Errors
    ///
    /// See [`PolicyStore::load`].
    pub async fn load_cid(&self, cid: &Cid) -> AccessResult<PolicyParams> {
        let document = self.dag.get(cid).await?;
        let params = PolicyParams::from_document(document)?;
        debug!(%cid, name = params.name(), "loaded policy");
        Ok(params)
    }
}

impl std::fmt::Debug for PolicyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AccessError;
    use serde_json::json;
    use tallylab_storage::BlockDag;

    fn store() -> (PolicyStore, Arc<BlockDag>) {
        let dag = Arc::new(BlockDag::in_memory());
        (PolicyStore::new(dag.clone()), dag)
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let (store, _) = store();
        let params = PolicyParams::new("root", ["idA", "idB"]);

        let cid = store.save(&params).await.unwrap();
        assert_eq!(store.load_cid(&cid).await.unwrap(), params);
        assert_eq!(store.load(&cid.to_reference()).await.unwrap(), params);
        assert_eq!(store.load(&cid.to_string()).await.unwrap(), params);
    }

    #[tokio::test]
    async fn test_save_is_deterministic() {
        let (first, _) = store();
        let (second, _) = store();

        let a = first.save(&PolicyParams::new("root", ["idB", "idA"])).await.unwrap();
        let b = second.save(&PolicyParams::new("root", ["idA", "idB"])).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let (store, _) = store();
        let absent = Cid::of(b"absent");
        assert!(matches!(
            store.load(&absent.to_string()).await,
            Err(AccessError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_load_without_write_is_malformed() {
        let (store, dag) = store();
        let cid = dag
            .put(&json!({ "name": "root", "type": "tallylab" }))
            .await
            .unwrap();
        assert!(matches!(
            store.load_cid(&cid).await,
            Err(AccessError::MalformedPolicy(_))
        ));
    }

    #[tokio::test]
    async fn test_load_rejects_bad_address() {
        let (store, _) = store();
        assert!(matches!(
            store.load("/ipfs/nope").await,
            Err(AccessError::InvalidAddress(_))
        ));
    }
}
