//! Configuration management for wakegate
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. YAML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use wakegate::config::Config;
//! use wakegate::handlers::HandlerRegistry;
//!
//! let registry = HandlerRegistry::with_defaults();
//! let config = Config::load(None, &registry).expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `WAKEGATE__<section>__<key>`, e.g. `WAKEGATE__SERVER__BIND_ADDR=0.0.0.0:9000`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/wakegate.yaml`.
//! This can be overridden with the `WAKEGATE_CONFIG` environment variable or
//! the `-c/--config` CLI flag.

pub mod models;
mod sources;
mod validation;

pub use models::{Config, MappingDefinition, ServerConfig};
pub use validation::ValidationError;

use crate::handlers::HandlerRegistry;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration and validate it against the handler registry.
    ///
    /// `path_override` (usually the CLI `-c` flag) takes precedence over the
    /// `WAKEGATE_CONFIG` environment variable and the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed, or if validation
    /// fails (unknown handler type, unsupported method, bad route pattern).
    pub fn load(
        path_override: Option<PathBuf>,
        registry: &HandlerRegistry,
    ) -> Result<Self, ConfigError> {
        let config = sources::load(path_override)?;
        validation::validate(&config, registry)?;
        Ok(config)
    }

    /// Load configuration from a specific path.
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(
        path: PathBuf,
        registry: &HandlerRegistry,
    ) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config, registry)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.yaml");
        fs::write(&config_path, content).unwrap();
        (temp_dir, config_path)
    }

    #[test]
    fn test_load_minimal_config() {
        let (_guard, path) = write_config(
            r#"
targets:
  - source_url: "http://wake.local/go"
    target_url: "http://10.0.0.5:80"
    handler: "wol"
    options:
      mac: "AA:BB:CC:DD:EE:FF"
      timeout_s: "5"
"#,
        );

        let registry = HandlerRegistry::with_defaults();
        let config = Config::load_from_path(path, &registry).unwrap();
        assert_eq!(config.targets.len(), 1);
        assert_eq!(config.targets[0].handler, "wol");
    }

    #[test]
    fn test_validation_catches_unknown_handler() {
        let (_guard, path) = write_config(
            r#"
targets:
  - source_url: "http://wake.local/go"
    target_url: "http://10.0.0.5:80"
    handler: "teleport"
"#,
        );

        let registry = HandlerRegistry::with_defaults();
        let result = Config::load_from_path(path, &registry);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::UnknownHandler { .. })
        ));
    }

    #[test]
    fn test_validation_catches_empty_targets() {
        let (_guard, path) = write_config("targets: []\n");

        let registry = HandlerRegistry::with_defaults();
        let result = Config::load_from_path(path, &registry);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::NoTargetsConfigured)
        ));
    }
}
