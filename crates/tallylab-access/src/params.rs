//! Policy parameters and controller options.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AccessError, AccessResult};

/// Discriminator of the TallyLab access controller kind.
pub const TALLYLAB_CONTROLLER_TYPE: &str = "tallylab";

/// The persisted configuration of a TallyLab access controller.
///
/// Serializes as `{ "name": .., "type": "tallylab", "write": [..] }`. The
/// write-set is kept sorted and de-duplicated, so two callers listing the same
/// writers in a different order produce the same document and the same
/// content identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyParams {
    name: String,
    #[serde(rename = "type")]
    controller_type: String,
    write: BTreeSet<String>,
}

impl PolicyParams {
    /// Build parameters for the database `name` with the given writers.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, write: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            controller_type: TALLYLAB_CONTROLLER_TYPE.to_owned(),
            write: write.into_iter().map(Into::into).collect(),
        }
    }

    /// Logical database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Controller discriminator. Always [`TALLYLAB_CONTROLLER_TYPE`].
    #[must_use]
    pub fn controller_type(&self) -> &str {
        &self.controller_type
    }

    /// The ids authorized to append, in sorted order.
    #[must_use]
    pub fn write(&self) -> &BTreeSet<String> {
        &self.write
    }

    /// Check whether `id` is in the write-set.
    #[must_use]
    pub fn allows_writer(&self, id: &str) -> bool {
        self.write.contains(id)
    }

    /// Encode as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Serialization`] if encoding fails.
    pub fn to_document(&self) -> AccessResult<Value> {
        serde_json::to_value(self).map_err(|e| AccessError::Serialization(e.to_string()))
    }

    /// Decode and validate a stored JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::MalformedPolicy`] if a field is missing or has the
    /// wrong shape, or if the type is not [`TALLYLAB_CONTROLLER_TYPE`].
    pub fn from_document(document: Value) -> AccessResult<Self> {
        let params: Self = serde_json::from_value(document)
            .map_err(|e| AccessError::MalformedPolicy(e.to_string()))?;
        if params.controller_type != TALLYLAB_CONTROLLER_TYPE {
            return Err(AccessError::MalformedPolicy(format!(
                "expected type '{TALLYLAB_CONTROLLER_TYPE}', found '{}'",
                params.controller_type
            )));
        }
        Ok(params)
    }
}

/// Caller-supplied options for creating an access controller.
///
/// This is the unbound form: it names a controller kind and its writers but
/// is not yet attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerOptions {
    /// Logical database name the controller guards.
    pub name: String,
    /// Controller kind to create.
    #[serde(rename = "type", default = "default_controller_type")]
    pub controller_type: String,
    /// Ids authorized to append. Order and duplicates are not significant.
    #[serde(default)]
    pub write: Vec<String>,
}

fn default_controller_type() -> String {
    TALLYLAB_CONTROLLER_TYPE.to_owned()
}

impl ControllerOptions {
    /// Options for a TallyLab controller over `name` with the given writers.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, write: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            controller_type: default_controller_type(),
            write: write.into_iter().map(Into::into).collect(),
        }
    }

    /// Select a different controller kind.
    #[must_use]
    pub fn with_type(mut self, controller_type: impl Into<String>) -> Self {
        self.controller_type = controller_type.into();
        self
    }

    /// The policy parameters these options describe.
    #[must_use]
    pub fn to_params(&self) -> PolicyParams {
        PolicyParams::new(self.name.clone(), self.write.iter().cloned())
    }
}
