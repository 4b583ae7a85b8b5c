use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "WAKEGATE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/wakegate.yaml";
const ENV_PREFIX: &str = "WAKEGATE";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. YAML file
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
///
/// The file path is `path_override` if given, else `$WAKEGATE_CONFIG`,
/// else `config/wakegate.yaml`.
pub fn load(path_override: Option<PathBuf>) -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = path_override
        .or_else(|| env::var(CONFIG_ENV_VAR).map(PathBuf::from).ok())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    tracing::info!("Loading configuration from: {}", config_path.display());

    let builder = config::Config::builder()
        // The configuration file is required
        .add_source(File::from(config_path).required(true))
        // Environment variable overrides
        // WAKEGATE__SERVER__BIND_ADDR -> server.bind_addr
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        assert!(load_from_sources(config_path).is_err());
    }

    #[test]
    fn test_load_from_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.yaml");

        let yaml_content = r#"
server:
  bind_addr: "127.0.0.1:9000"

targets:
  - source_url: "http://wake.local/go"
    target_url: "http://10.0.0.5:80"
    handler: "wol"
    options:
      mac: "AA:BB:CC:DD:EE:FF"
      timeout_s: "5"
  - source_url: "http://files.local/share/*"
    target_url: "http://nas.lan:5000/share"
    handler: "plain"
    methods: ["GET"]
"#;

        fs::write(&config_path, yaml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].handler, "wol");
        assert_eq!(config.targets[1].methods, vec!["GET"]);
    }

    #[test]
    fn test_server_section_is_optional() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.yaml");

        let yaml_content = r#"
targets:
  - source_url: "http://a.local/x"
    target_url: "http://b.local/y"
    handler: "plain"
"#;

        fs::write(&config_path, yaml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
    }

    // Note: env override tests are omitted due to unsafe env::set_var usage
}
