//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `<home>/config.toml` (user)
//! 3. Merge the explicitly requested file, if any
//! 4. Apply `TALLYLAB_*` environment overrides
//! 5. Deserialize merged tree → `Config`, filling in the node home
//! 6. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Overrides the node home directory.
pub const HOME_ENV: &str = "TALLYLAB_HOME";
/// Overrides the log level, or adds a directive if it contains `=`.
pub const LOG_ENV: &str = "TALLYLAB_LOG";
/// Selects the `fs` backend at the given path.
pub const STORE_ENV: &str = "TALLYLAB_STORE";

/// A loaded configuration and the files it was built from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged, validated configuration.
    pub config: Config,
    /// Files that contributed, in merge order.
    pub loaded_files: Vec<String>,
}

/// Load configuration using the process environment.
///
/// The home directory is `$TALLYLAB_HOME` if set, otherwise `~/.tallylab`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, or if the
/// final merged configuration fails validation.
pub fn load(explicit: Option<&Path>) -> ConfigResult<LoadedConfig> {
    let env_vars = collect_env_vars();
    let home = match env_vars.get(HOME_ENV) {
        Some(home) => PathBuf::from(home),
        None => default_home()?,
    };
    load_layers(&home, explicit, &env_vars)
}

/// Load configuration from `home`, an optional explicit file and `env_vars`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if a file is malformed, the explicit file is
/// missing, or validation fails.
pub fn load_layers(
    home: &Path,
    explicit: Option<&Path>,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<LoadedConfig> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut loaded_files = Vec::new();

    let user_path = home.join("config.toml");
    if let Some(overlay) = try_load_file(&user_path)? {
        deep_merge(&mut merged, &overlay);
        loaded_files.push(user_path.display().to_string());
        info!(path = %user_path.display(), "loaded user config");
    }

    if let Some(path) = explicit {
        let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })?;
        deep_merge(&mut merged, &overlay);
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), "loaded config file");
    }

    apply_env_overrides(&mut merged, env_vars);

    let mut config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;
    if config.node.home.is_none() {
        config.node.home = Some(home.to_path_buf());
    }

    validate::validate(&config)?;

    Ok(LoadedConfig {
        config,
        loaded_files,
    })
}

/// Parse a single config file with no layering.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed or validated.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
        path: path.display().to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    })?;
    let config: Config = overlay
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

/// Recursively deep-merge `overlay` into `base`.
///
/// Tables merge per field; scalars and arrays from the overlay replace.
fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

fn apply_env_overrides(merged: &mut toml::Value, env_vars: &HashMap<String, String>) {
    if let Some(log) = env_vars.get(LOG_ENV) {
        if log.contains('=') {
            if let Some(toml::Value::Array(directives)) = section(merged, "logging")
                .map(|logging| {
                    logging
                        .entry("directives")
                        .or_insert(toml::Value::Array(Vec::new()))
                })
            {
                directives.push(toml::Value::String(log.clone()));
            }
        } else if let Some(logging) = section(merged, "logging") {
            logging.insert("level".to_owned(), toml::Value::String(log.clone()));
        }
        debug!(var = LOG_ENV, "applied environment override");
    }

    if let Some(store) = env_vars.get(STORE_ENV)
        && let Some(storage) = section(merged, "storage")
    {
        storage.insert("backend".to_owned(), toml::Value::String("fs".to_owned()));
        storage.insert("path".to_owned(), toml::Value::String(store.clone()));
        debug!(var = STORE_ENV, "applied environment override");
    }
}

/// The top-level table `name`, created if absent.
fn section<'a>(merged: &'a mut toml::Value, name: &str) -> Option<&'a mut toml::Table> {
    merged
        .as_table_mut()?
        .entry(name)
        .or_insert(toml::Value::Table(toml::Table::new()))
        .as_table_mut()
}

fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with("TALLYLAB_"))
        .collect()
}

/// `~/.tallylab`.
fn default_home() -> ConfigResult<PathBuf> {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".tallylab"))
        .ok_or(ConfigError::NoHomeDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StorageBackend;

    fn no_env() -> HashMap<String, String> {
        HashMap::new()
    }

    #[test]
    fn test_defaults_deserialize_to_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Fs);
        assert_eq!(config.database.default_type, "keyvalue");
        assert_eq!(config.logging.level, "info");
        assert!(config.node.home.is_none());
    }

    #[test]
    fn test_load_without_files_fills_home() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_layers(dir.path(), None, &no_env()).unwrap();

        assert!(loaded.loaded_files.is_empty());
        assert_eq!(loaded.config.home(), Some(dir.path()));
        assert_eq!(loaded.config.blocks_dir(), Some(dir.path().join("blocks")));
        assert_eq!(
            loaded.config.keystore_dir(),
            Some(dir.path().join("keystore"))
        );
    }

    #[test]
    fn test_user_then_explicit_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[database]\ndefault_type = \"eventlog\"\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        let explicit = dir.path().join("override.toml");
        std::fs::write(&explicit, "[logging]\nlevel = \"warn\"\n").unwrap();

        let loaded = load_layers(dir.path(), Some(&explicit), &no_env()).unwrap();
        assert_eq!(loaded.loaded_files.len(), 2);
        assert_eq!(loaded.config.database.default_type, "eventlog");
        assert_eq!(loaded.config.logging.level, "warn");
        assert_eq!(loaded.config.logging.format, "compact");
    }

    #[test]
    fn test_env_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[storage]\nbackend = \"memory\"\n",
        )
        .unwrap();
        let env: HashMap<String, String> = [
            (LOG_ENV.to_owned(), "trace".to_owned()),
            (STORE_ENV.to_owned(), "/var/lib/tallylab".to_owned()),
        ]
        .into_iter()
        .collect();

        let config = load_layers(dir.path(), None, &env).unwrap().config;
        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.storage.backend, StorageBackend::Fs);
        assert_eq!(
            config.blocks_dir(),
            Some(PathBuf::from("/var/lib/tallylab"))
        );
    }

    #[test]
    fn test_log_env_directive() {
        let dir = tempfile::tempdir().unwrap();
        let env: HashMap<String, String> =
            [(LOG_ENV.to_owned(), "tallylab_access=trace".to_owned())]
                .into_iter()
                .collect();

        let config = load_layers(dir.path(), None, &env).unwrap().config;
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.directives, vec!["tallylab_access=trace"]);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_layers(dir.path(), Some(&dir.path().join("nope.toml")), &no_env());
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[logging]\nformat = \"xml\"\n").unwrap();
        assert!(matches!(
            load_layers(dir.path(), None, &no_env()),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[storage\n").unwrap();
        assert!(matches!(
            load_layers(dir.path(), None, &no_env()),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_oversized_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("huge.toml");
        let data = format!("x = \"{}\"", "a".repeat(1_100_000));
        std::fs::write(&file_path, data).unwrap();

        let result = try_load_file(&file_path);
        assert!(
            matches!(result, Err(ConfigError::ValidationError { .. })),
            "Expected ValidationError for oversized config, got: {result:?}"
        );
    }

    #[test]
    fn test_load_file_nonexistent() {
        let result = load_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}
