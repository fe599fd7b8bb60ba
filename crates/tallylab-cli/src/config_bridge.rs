//! Bridge from `tallylab_config::Config` to telemetry settings.

use tallylab_config::Config;
use tallylab_telemetry::{LogConfig, LogFormat};

/// Convert the logging section into a [`LogConfig`].
///
/// Validation has already rejected unknown formats, so a parse failure
/// here falls back to compact output.
pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or(LogFormat::Compact);

    LogConfig::new(&cfg.logging.level)
        .with_format(format)
        .with_directives(cfg.logging.directives.iter().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_section_maps_to_log_config() {
        let mut cfg = Config::default();
        cfg.logging.level = "debug".to_owned();
        cfg.logging.format = "json".to_owned();
        cfg.logging.directives = vec!["tallylab_access=trace".to_owned()];

        let log = to_log_config(&cfg);
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Json);
        assert_eq!(log.directives, vec!["tallylab_access=trace"]);
    }

    #[test]
    fn test_defaults_are_compact_info() {
        let log = to_log_config(&Config::default());
        assert_eq!(log.level, "info");
        assert_eq!(log.format, LogFormat::Compact);
        assert!(log.directives.is_empty());
    }
}
