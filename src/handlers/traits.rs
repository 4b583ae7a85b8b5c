use async_trait::async_trait;
use axum::http::Method;

use crate::api::error::ProxyError;
use crate::config::{MappingDefinition, ValidationError};

/// Static metadata for a handler variant, shown by `wakegate list-handlers`
/// and on the routes listing page.
#[derive(Debug, Clone, Copy)]
pub struct HandlerSpec {
    /// Registry key referenced by `handler:` in the configuration
    pub key: &'static str,
    pub summary: &'static str,
    pub description: &'static str,
    /// Option keys that must be present in `MappingDefinition::options`
    pub required_options: &'static [&'static str],
}

/// The redirect a handler resolved for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectAction {
    pub location: String,
}

/// Per-request redirect capability.
///
/// Implementations are constructed once at startup from a mapping definition
/// and shared across all in-flight requests; `handle` must not rely on any
/// cross-request mutable state.
#[async_trait]
pub trait RedirectHandler: Send + Sync {
    fn spec(&self) -> &HandlerSpec;

    fn mapping(&self) -> &MappingDefinition;

    /// Resolve the redirect for one request. `path_remainder` is the portion
    /// of the request path captured by a trailing wildcard, if any.
    async fn handle(
        &self,
        method: &Method,
        path_remainder: Option<&str>,
    ) -> Result<RedirectAction, ProxyError>;
}

/// Fail construction when any of `spec.required_options` is absent from the
/// mapping's options.
pub fn require_options(
    spec: &HandlerSpec,
    mapping: &MappingDefinition,
) -> Result<(), ValidationError> {
    let missing: Vec<&str> = spec
        .required_options
        .iter()
        .copied()
        .filter(|key| !mapping.options.contains_key(*key))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingOptions {
            handler: spec.key.to_string(),
            keys: missing.join(", "),
        })
    }
}
