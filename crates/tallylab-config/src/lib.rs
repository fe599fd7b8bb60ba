#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Layered configuration for TallyLab nodes.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tallylab_config::Config;
//!
//! let loaded = Config::load(None).unwrap();
//! println!("database type: {}", loaded.config.database.default_type);
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Environment variables** (`TALLYLAB_LOG`, `TALLYLAB_STORE`)
//! 2. **Explicit file** passed by the caller
//! 3. **User** (`$TALLYLAB_HOME/config.toml`, default `~/.tallylab/config.toml`)
//! 4. **Embedded defaults** (`defaults.toml` compiled into the binary)

/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{HOME_ENV, LOG_ENV, LoadedConfig, STORE_ENV};
pub use types::*;

impl Config {
    /// Load configuration with the full precedence chain.
    ///
    /// See [`loader::load`] for the algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any config file is malformed or the final
    /// configuration fails validation.
    pub fn load(explicit: Option<&std::path::Path>) -> ConfigResult<LoadedConfig> {
        loader::load(explicit)
    }
}
