//! Database manifests and addresses.
//!
//! A database address is derived entirely from content:
//!
//! ```text
//! policy   = cid({ name, type: "tallylab", write })
//! manifest = cid({ name, type: db_type, accessController: "/dag/<policy>" })
//! address  = /tallylab/<manifest>/<name>
//! ```
//!
//! Anyone who knows the database name, its type and the writer set can
//! compute the address without contacting the node that created it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tallylab_storage::{Cid, cid_of_document};

use crate::error::{AccessError, AccessResult};
use crate::params::PolicyParams;

/// Leading path segment of every database address.
pub const ADDRESS_PREFIX: &str = "tallylab";

/// The top-level document describing a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Logical database name.
    pub name: String,
    /// Database type, e.g. `keyvalue`.
    #[serde(rename = "type")]
    pub db_type: String,
    /// `/dag/<cid>` reference to the saved access policy.
    #[serde(rename = "accessController")]
    pub access_controller: String,
}

impl Manifest {
    /// Build a manifest pointing at the policy stored under `policy`.
    #[must_use]
    pub fn new(name: impl Into<String>, db_type: impl Into<String>, policy: &Cid) -> Self {
        Self {
            name: name.into(),
            db_type: db_type.into(),
            access_controller: policy.to_reference(),
        }
    }

    /// Resolve the access controller reference.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::InvalidAddress`] if the reference does not parse.
    pub fn policy_cid(&self) -> AccessResult<Cid> {
        Ok(Cid::from_reference(&self.access_controller)?)
    }

    /// Encode as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Serialization`] if encoding fails.
    pub fn to_document(&self) -> AccessResult<Value> {
        serde_json::to_value(self).map_err(|e| AccessError::Serialization(e.to_string()))
    }

    /// Decode a stored JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::MalformedManifest`] if the document has the wrong shape.
    pub fn from_document(document: Value) -> AccessResult<Self> {
        serde_json::from_value(document).map_err(|e| AccessError::MalformedManifest(e.to_string()))
    }
}

/// A parsed `/tallylab/<manifest-cid>/<name>` address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseAddress {
    root: Cid,
    name: String,
}

impl DatabaseAddress {
    /// Address of the database whose manifest is stored under `root`.
    #[must_use]
    pub fn new(root: Cid, name: impl Into<String>) -> Self {
        Self {
            root,
            name: name.into(),
        }
    }

    /// Parse the string form.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::InvalidAddress`] if the prefix, the manifest
    /// identifier or the name is missing or malformed.
    pub fn parse(address: &str) -> AccessResult<Self> {
        let invalid = || AccessError::InvalidAddress(address.to_owned());

        let rest = address
            .strip_prefix('/')
            .and_then(|rest| rest.strip_prefix(ADDRESS_PREFIX))
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(invalid)?;
        let (root, name) = rest.split_once('/').ok_or_else(invalid)?;
        if name.is_empty() {
            return Err(invalid());
        }
        let root = Cid::parse(root).map_err(|_| invalid())?;

        Ok(Self::new(root, name))
    }

    /// Content identifier of the manifest.
    #[must_use]
    pub fn root(&self) -> &Cid {
        &self.root
    }

    /// Logical database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for DatabaseAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{ADDRESS_PREFIX}/{}/{}", self.root, self.name)
    }
}

impl FromStr for DatabaseAddress {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Every identifier derived for one database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedAddress {
    /// Content identifier of the policy document.
    pub policy: Cid,
    /// The manifest document.
    pub manifest: Manifest,
    /// The database address.
    pub address: DatabaseAddress,
}

/// Compute a database's identifiers without touching any store.
///
/// # Errors
///
/// Returns an error if a document cannot be canonically encoded.
pub fn derive_address(params: &PolicyParams, db_type: &str) -> AccessResult<DerivedAddress> {
    let policy = cid_of_document(&params.to_document()?)?;
    let manifest = Manifest::new(params.name(), db_type, &policy);
    let root = cid_of_document(&manifest.to_document()?)?;

    Ok(DerivedAddress {
        policy,
        address: DatabaseAddress::new(root, params.name()),
        manifest,
    })
}
