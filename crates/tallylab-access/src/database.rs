//! Creating and opening databases.
//!
//! A [`Database`] is the bound result of either path: a controller attached
//! to the node, plus the manifest and address it was reached through.

use std::sync::Arc;

use serde_json::Value;
use tallylab_storage::Cid;
use tracing::{debug, info};

use crate::address::{DatabaseAddress, Manifest};
use crate::controller::AccessController;
use crate::decision::AccessDecision;
use crate::entry::LogEntry;
use crate::error::{AccessError, AccessResult};
use crate::node::NodeContext;
use crate::params::ControllerOptions;
use crate::registry::ControllerRegistry;

/// An open database with its access controller bound to this node.
pub struct Database {
    address: DatabaseAddress,
    manifest: Manifest,
    controller: Arc<dyn AccessController>,
    node: NodeContext,
}

impl Database {
    /// The database address.
    #[must_use]
    pub fn address(&self) -> &DatabaseAddress {
        &self.address
    }

    /// The manifest the address names.
    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// The bound access controller.
    #[must_use]
    pub fn controller(&self) -> &Arc<dyn AccessController> {
        &self.controller
    }

    /// Check whether `entry` may be appended, using the node's verifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the verifier fails.
    pub async fn can_append(&self, entry: &LogEntry) -> AccessResult<bool> {
        self.controller
            .can_append(entry, self.node.verifier.as_ref())
            .await
    }

    /// Append `payload` as this node's identity.
    ///
    /// The entry is stored only if the controller allows it. Returns the
    /// entry's content identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::WriteDenied`] if the controller refuses the
    /// entry, or an error if verification or storage fails.
    pub async fn append(&self, payload: Value) -> AccessResult<Cid> {
        let entry = LogEntry::new(self.node.identity.clone(), payload);
        let decision = self
            .controller
            .evaluate(&entry, self.node.verifier.as_ref())
            .await?;

        if let AccessDecision::Deny(denial) = decision {
            return Err(AccessError::WriteDenied {
                writer: self.node.identity.id.clone(),
                denial,
            });
        }

        let document =
            serde_json::to_value(&entry).map_err(|e| AccessError::Serialization(e.to_string()))?;
        let cid = self.node.dag.put(&document).await?;
        debug!(db = %self.address, entry = %cid, "appended entry");
        Ok(cid)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("address", &self.address.to_string())
            .field("manifest", &self.manifest)
            .finish_non_exhaustive()
    }
}

/// Create a database of type `db_type` guarded by a controller built from `options`.
///
/// The policy and the manifest are both written to the node's store, so the
/// returned address can be opened by any node sharing that store.
///
/// # Errors
///
/// Returns an error if the controller kind is unknown or a document cannot
/// be stored.
pub async fn create_database(
    registry: &ControllerRegistry,
    node: &NodeContext,
    db_type: &str,
    options: &ControllerOptions,
) -> AccessResult<Database> {
    let controller = registry.create(node, options)?;
    let policy = controller.save().await?;

    let manifest = Manifest::new(options.name.clone(), db_type, &policy);
    let root = node.dag.put(&manifest.to_document()?).await?;
    let address = DatabaseAddress::new(root, options.name.clone());

    info!(%address, controller = controller.controller_type(), "created database");
    Ok(Database {
        address,
        manifest,
        controller,
        node: node.clone(),
    })
}

/// Open the database at `address`, binding its saved policy to `node`.
///
/// # Errors
///
/// - [`AccessError::InvalidAddress`] if the address does not parse or does
///   not match its manifest
/// - [`AccessError::NotFound`] if the manifest or policy is not in the store
/// - [`AccessError::MalformedManifest`] or [`AccessError::MalformedPolicy`]
///   if either document has the wrong shape
/// - [`AccessError::UnknownControllerType`] if the policy's type is not
///   registered
pub async fn open_database(
    registry: &ControllerRegistry,
    node: &NodeContext,
    address: &str,
) -> AccessResult<Database> {
    let address = DatabaseAddress::parse(address)?;
    let manifest = Manifest::from_document(node.dag.get(address.root()).await?)?;
    if manifest.name != address.name() {
        return Err(AccessError::InvalidAddress(format!(
            "{address} names '{}' but its manifest names '{}'",
            address.name(),
            manifest.name
        )));
    }

    let policy = manifest.policy_cid()?;
    let policy_document = node.dag.get(&policy).await?;
    let controller_type = policy_document
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| AccessError::MalformedPolicy("missing controller type".into()))?
        .to_owned();
    let controller = registry
        .get(&controller_type)?
        .load(node, policy_document)?;

    info!(%address, controller = controller.controller_type(), "opened database");
    Ok(Database {
        address,
        manifest,
        controller,
        node: node.clone(),
    })
}
