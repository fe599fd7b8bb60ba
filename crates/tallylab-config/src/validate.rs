//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Config, StorageBackend};

/// Validate a fully merged configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_storage(config)?;
    validate_database(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_storage(config: &Config) -> ConfigResult<()> {
    if config.storage.backend == StorageBackend::Fs && config.blocks_dir().is_none() {
        return Err(ConfigError::ValidationError {
            field: "storage.path".to_owned(),
            message: "the fs backend needs a path or a node home".to_owned(),
        });
    }
    Ok(())
}

fn validate_database(config: &Config) -> ConfigResult<()> {
    if config.database.default_type.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.default_type".to_owned(),
            message: "must not be empty".to_owned(),
        });
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                valid_levels.join(", ")
            ),
        });
    }

    let valid_formats = ["pretty", "compact", "json", "full"];
    if !valid_formats.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                valid_formats.join(", ")
            ),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn valid() -> Config {
        let mut config = Config::default();
        config.node.home = Some(PathBuf::from("/tmp/tallylab"));
        config
    }

    #[test]
    fn test_default_with_home_is_valid() {
        assert!(validate(&valid()).is_ok());
    }

    #[test]
    fn test_fs_backend_needs_a_location() {
        let config = Config::default();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError { field, .. }) if field == "storage.path"
        ));

        let mut memory = Config::default();
        memory.storage.backend = StorageBackend::Memory;
        assert!(validate(&memory).is_ok());
    }

    #[test]
    fn test_empty_default_type_rejected() {
        let mut config = valid();
        config.database.default_type = "  ".to_owned();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let mut config = valid();
        config.logging.format = "xml".to_owned();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError { field, .. }) if field == "logging.format"
        ));

        let mut config = valid();
        config.logging.level = "loud".to_owned();
        assert!(validate(&config).is_err());
    }
}
