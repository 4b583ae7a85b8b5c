use super::models::Config;
use crate::handlers::HandlerRegistry;
use crate::routing::{RoutePattern, method_filter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("No targets configured (at least one mapping is required)")]
    NoTargetsConfigured,

    #[error("Unknown handler '{handler}', available: [{known}]")]
    UnknownHandler { handler: String, known: String },

    #[error("Handler '{handler}' is missing required options: [{keys}]")]
    MissingOptions { handler: String, keys: String },

    #[error("Handler '{handler}' option '{key}' has invalid value '{value}': {reason}")]
    InvalidOption {
        handler: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("URL '{url}' has no hostname")]
    MissingHost { url: String },

    #[error("Unsupported HTTP method '{method}'")]
    UnsupportedMethod { method: String },

    #[error("Invalid route pattern '{path}': a wildcard may only appear as the final segment")]
    InvalidRoutePattern { path: String },
}

/// Validate the entire configuration against the handler registry.
///
/// Structural checks only: option values are parsed when handlers are
/// constructed, which also happens before the server starts serving.
pub fn validate(config: &Config, registry: &HandlerRegistry) -> Result<(), ValidationError> {
    if config.targets.is_empty() {
        return Err(ValidationError::NoTargetsConfigured);
    }

    for mapping in &config.targets {
        if !registry.is_known(&mapping.handler) {
            return Err(ValidationError::UnknownHandler {
                handler: mapping.handler.clone(),
                known: registry.known_keys().join(", "),
            });
        }

        for url in [&mapping.source_url, &mapping.target_url] {
            if url.host_str().is_none() {
                return Err(ValidationError::MissingHost {
                    url: url.to_string(),
                });
            }
        }

        method_filter(&mapping.methods)?;
        RoutePattern::parse(mapping.source_url.path())?;
    }

    Ok(())
}
