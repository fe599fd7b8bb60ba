//! Local keystore.
//!
//! Holds the node's keystore keys, one per identity id. Possession of the
//! key named after an id is what the access layer's local-key check asks
//! about. Keys live in memory, or in a directory as `<dir>/<name>.key`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tallylab_crypto::{KeyPair, Signature};
use tracing::debug;

use crate::error::{IdentityError, IdentityResult};

const KEY_FILE_EXTENSION: &str = "key";

/// Validate that a key name is safe to use as a file stem.
fn validate_key_name(name: &str) -> IdentityResult<()> {
    let valid = !name.is_empty()
        && name.len() <= 128
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(IdentityError::InvalidKeyName(name.to_owned()))
    }
}

/// Named Ed25519 keys held by this node.
#[derive(Default)]
pub struct Keystore {
    keys: RwLock<HashMap<String, Arc<KeyPair>>>,
    directory: Option<PathBuf>,
}

impl Keystore {
    /// Create a keystore that only lives in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a keystore backed by `directory`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Keystore`] if the directory cannot be created.
    pub fn open(directory: impl AsRef<Path>) -> IdentityResult<Self> {
        let directory = directory.as_ref().to_path_buf();
        std::fs::create_dir_all(&directory)
            .map_err(|e| IdentityError::Keystore(format!("{}: {e}", directory.display())))?;
        Ok(Self {
            keys: RwLock::new(HashMap::new()),
            directory: Some(directory),
        })
    }

    /// The backing directory, if any.
    #[must_use]
    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    fn key_path(&self, name: &str) -> Option<PathBuf> {
        self.directory
            .as_ref()
            .map(|dir| dir.join(name).with_extension(KEY_FILE_EXTENSION))
    }

    fn cached(&self, name: &str) -> IdentityResult<Option<Arc<KeyPair>>> {
        let keys = self
            .keys
            .read()
            .map_err(|e| IdentityError::Keystore(e.to_string()))?;
        Ok(keys.get(name).cloned())
    }

    fn cache(&self, name: &str, key: KeyPair) -> IdentityResult<Arc<KeyPair>> {
        let mut keys = self
            .keys
            .write()
            .map_err(|e| IdentityError::Keystore(e.to_string()))?;
        Ok(Arc::clone(
            keys.entry(name.to_owned()).or_insert_with(|| Arc::new(key)),
        ))
    }

    /// Get the key stored under `name`, creating it if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the key file cannot be
    /// read or written.
    pub fn get_or_create_key(&self, name: &str) -> IdentityResult<Arc<KeyPair>> {
        validate_key_name(name)?;
        if let Some(key) = self.cached(name)? {
            return Ok(key);
        }

        let key = match self.key_path(name) {
            Some(path) => KeyPair::load_or_generate(path)?,
            None => KeyPair::generate(),
        };
        debug!(name, "keystore key ready");
        self.cache(name, key)
    }

    /// Get the key stored under `name`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or an existing key file
    /// cannot be read.
    pub fn get_key(&self, name: &str) -> IdentityResult<Option<Arc<KeyPair>>> {
        validate_key_name(name)?;
        if let Some(key) = self.cached(name)? {
            return Ok(Some(key));
        }

        let Some(path) = self.key_path(name) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let key = KeyPair::load(&path)?;
        self.cache(name, key).map(Some)
    }

    /// Check whether a key is stored under `name`.
    ///
    /// Names that could never be stored report `false` rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory table is poisoned.
    pub fn has_key(&self, name: &str) -> IdentityResult<bool> {
        if validate_key_name(name).is_err() {
            return Ok(false);
        }
        if self.cached(name)?.is_some() {
            return Ok(true);
        }
        Ok(self.key_path(name).is_some_and(|path| path.is_file()))
    }

    /// Remove the key stored under `name`. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the key file cannot be removed.
    pub fn remove_key(&self, name: &str) -> IdentityResult<bool> {
        validate_key_name(name)?;
        let in_memory = self
            .keys
            .write()
            .map_err(|e| IdentityError::Keystore(e.to_string()))?
            .remove(name)
            .is_some();

        let on_disk = match self.key_path(name) {
            Some(path) => match std::fs::remove_file(&path) {
                Ok(()) => true,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
                Err(e) => return Err(IdentityError::Keystore(e.to_string())),
            },
            None => false,
        };

        Ok(in_memory || on_disk)
    }

    /// Sign `data` with the key stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::KeyNotFound`] if there is no such key.
    pub fn sign(&self, name: &str, data: &[u8]) -> IdentityResult<Signature> {
        let key = self
            .get_key(name)?
            .ok_or_else(|| IdentityError::KeyNotFound(name.to_owned()))?;
        Ok(key.sign(data))
    }
}

impl std::fmt::Debug for Keystore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keystore")
            .field("directory", &self.directory)
            .finish_non_exhaustive()
    }
}
