//! Configuration struct definitions.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Fully merged node configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Node-local state.
    pub node: NodeSection,
    /// Block storage backend.
    pub storage: StorageSection,
    /// Database defaults.
    pub database: DatabaseSection,
    /// Logging and tracing.
    pub logging: LoggingSection,
}

impl Config {
    /// The node home directory, if one has been resolved.
    #[must_use]
    pub fn home(&self) -> Option<&Path> {
        self.node.home.as_deref()
    }

    /// Directory of the local keystore.
    #[must_use]
    pub fn keystore_dir(&self) -> Option<PathBuf> {
        self.home().map(|home| home.join("keystore"))
    }

    /// Path of the node's identity signing key.
    #[must_use]
    pub fn identity_key_path(&self) -> Option<PathBuf> {
        self.home().map(|home| home.join("identity.key"))
    }

    /// Directory of the filesystem block store.
    ///
    /// An explicit `storage.path` wins; otherwise `<home>/blocks`.
    #[must_use]
    pub fn blocks_dir(&self) -> Option<PathBuf> {
        self.storage
            .path
            .clone()
            .or_else(|| self.home().map(|home| home.join("blocks")))
    }
}

// ---------------------------------------------------------------------------
// NodeSection
// ---------------------------------------------------------------------------

/// Node-local state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSection {
    /// Directory holding the keystore and identity key.
    pub home: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// StorageSection
// ---------------------------------------------------------------------------

/// Where blocks are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In process memory only.
    Memory,
    /// In a directory on disk.
    #[default]
    Fs,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Fs => write!(f, "fs"),
        }
    }
}

/// Block storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Storage backend.
    pub backend: StorageBackend,
    /// Directory for the `fs` backend.
    pub path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// DatabaseSection
// ---------------------------------------------------------------------------

/// Defaults applied when creating databases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Database type recorded in new manifests.
    pub default_type: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            default_type: "keyvalue".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["tallylab_access=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
