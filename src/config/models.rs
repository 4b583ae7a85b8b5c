use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use url::Url;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Redirect mappings, in declaration order
    pub targets: Vec<MappingDefinition>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

/// A single redirect mapping.
///
/// `source_url` is the URL clients hit: its hostname selects the mapping
/// within a path group, and a path ending in a `*` segment captures the
/// remainder of the request path. `target_url` is where clients are sent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MappingDefinition {
    pub source_url: Url,
    pub target_url: Url,
    /// Handler type key, resolved against the handler registry
    pub handler: String,
    /// HTTP methods accepted on this mapping
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
    /// Handler-specific options
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl MappingDefinition {
    /// Hostname of `source_url`, lowercased for matching.
    pub fn source_host(&self) -> Option<String> {
        self.source_url.host_str().map(str::to_ascii_lowercase)
    }
}

fn default_methods() -> Vec<String> {
    vec!["GET".to_string(), "POST".to_string()]
}
