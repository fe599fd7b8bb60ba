//! Controller kinds, keyed by their type discriminator.
//!
//! The registry is an explicit value handed to whatever opens databases.
//! Nothing is registered globally. A kind only ever sees options or policy
//! documents whose type matches its own [`ControllerKind::type_name`].

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::controller::{AccessController, TallyLabAccessController};
use crate::error::{AccessError, AccessResult};
use crate::node::NodeContext;
use crate::params::{ControllerOptions, PolicyParams, TALLYLAB_CONTROLLER_TYPE};

/// A kind of access controller the registry can create and load.
pub trait ControllerKind: Send + Sync {
    /// The discriminator this kind is registered under.
    fn type_name(&self) -> &str;

    /// Bind fresh options to `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options are not valid for this kind.
    fn create(
        &self,
        node: &NodeContext,
        options: &ControllerOptions,
    ) -> AccessResult<Arc<dyn AccessController>>;

    /// Bind an already fetched policy document to `node`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not decode as this kind's policy.
    fn load(&self, node: &NodeContext, policy: Value) -> AccessResult<Arc<dyn AccessController>>;
}

/// The `tallylab` controller kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TallyLabKind;

impl ControllerKind for TallyLabKind {
    fn type_name(&self) -> &str {
        TALLYLAB_CONTROLLER_TYPE
    }

    fn create(
        &self,
        node: &NodeContext,
        options: &ControllerOptions,
    ) -> AccessResult<Arc<dyn AccessController>> {
        if options.controller_type != TALLYLAB_CONTROLLER_TYPE {
            return Err(AccessError::UnknownControllerType(
                options.controller_type.clone(),
            ));
        }
        Ok(Arc::new(TallyLabAccessController::new(
            node,
            options.to_params(),
        )))
    }

    fn load(&self, node: &NodeContext, policy: Value) -> AccessResult<Arc<dyn AccessController>> {
        let params = PolicyParams::from_document(policy)?;
        Ok(Arc::new(TallyLabAccessController::new(node, params)))
    }
}

/// Registry of controller kinds.
pub struct ControllerRegistry {
    kinds: HashMap<String, Arc<dyn ControllerKind>>,
}

impl ControllerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Create a registry with the built-in kinds registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut kinds: HashMap<String, Arc<dyn ControllerKind>> = HashMap::new();
        kinds.insert(TALLYLAB_CONTROLLER_TYPE.to_owned(), Arc::new(TallyLabKind));
        Self { kinds }
    }

    /// Register a controller kind.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::AlreadyRegistered`] if a kind with the same type
    /// is already present.
    pub fn register(&mut self, kind: Arc<dyn ControllerKind>) -> AccessResult<()> {
        let type_name = kind.type_name().to_owned();
        if self.kinds.contains_key(&type_name) {
            return Err(AccessError::AlreadyRegistered(type_name));
        }
        info!(controller = %type_name, "registered access controller kind");
        self.kinds.insert(type_name, kind);
        Ok(())
    }

    /// Look up the kind registered under `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::UnknownControllerType`] if none is registered.
    pub fn get(&self, type_name: &str) -> AccessResult<Arc<dyn ControllerKind>> {
        self.kinds
            .get(type_name)
            .cloned()
            .ok_or_else(|| AccessError::UnknownControllerType(type_name.to_owned()))
    }

    /// Check whether a kind is registered under `type_name`.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.kinds.contains_key(type_name)
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Create a controller of the kind named in `options`, bound to `node`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::UnknownControllerType`] if the kind is not
    /// registered, or any error the kind reports.
    pub fn create(
        &self,
        node: &NodeContext,
        options: &ControllerOptions,
    ) -> AccessResult<Arc<dyn AccessController>> {
        self.get(&options.controller_type)?.create(node, options)
    }
}

impl Default for ControllerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("types", &self.types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tallylab_crypto::KeyPair;
    use tallylab_identity::{Keystore, TallyLabIdentityProvider};
    use tallylab_storage::BlockDag;

    fn node() -> NodeContext {
        let provider = Arc::new(TallyLabIdentityProvider::new(Arc::new(
            Keystore::in_memory(),
        )));
        let identity = provider.create_identity(&KeyPair::generate()).unwrap();
        NodeContext::new(identity, provider, Arc::new(BlockDag::in_memory()))
    }

    #[test]
    fn test_kind_rejects_options_of_another_type() {
        let options = ControllerOptions::new("root", ["idA"]).with_type("ipfs");
        assert!(matches!(
            TallyLabKind.create(&node(), &options),
            Err(AccessError::UnknownControllerType(t)) if t == "ipfs"
        ));
    }

    #[test]
    fn test_kind_binds_fetched_policy_document() {
        let node = node();
        let controller = TallyLabKind
            .load(
                &node,
                json!({ "name": "root", "type": "tallylab", "write": ["idB", "idA"] }),
            )
            .unwrap();
        assert_eq!(controller.params(), &PolicyParams::new("root", ["idA", "idB"]));

        assert!(matches!(
            TallyLabKind.load(&node, json!({ "name": "root", "type": "tallylab" })),
            Err(AccessError::MalformedPolicy(_))
        ));
    }

    #[test]
    fn test_defaults_include_tallylab() {
        let registry = ControllerRegistry::with_defaults();
        assert!(registry.contains("tallylab"));
        assert_eq!(registry.types(), vec!["tallylab"]);
        assert_eq!(registry.get("tallylab").unwrap().type_name(), "tallylab");
    }

    #[test]
    fn test_empty_registry_rejects_lookup() {
        let registry = ControllerRegistry::new();
        assert!(matches!(
            registry.get("tallylab"),
            Err(AccessError::UnknownControllerType(t)) if t == "tallylab"
        ));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = ControllerRegistry::new();
        registry.register(Arc::new(TallyLabKind)).unwrap();
        assert!(matches!(
            registry.register(Arc::new(TallyLabKind)),
            Err(AccessError::AlreadyRegistered(_))
        ));
    }
}
