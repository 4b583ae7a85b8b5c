use async_trait::async_trait;
use axum::http::Method;
use std::sync::Arc;
use tracing::info;

use super::registry::HandlerEntry;
use super::traits::{HandlerSpec, RedirectAction, RedirectHandler, require_options};
use crate::api::error::ProxyError;
use crate::config::{MappingDefinition, ValidationError};

const SPEC: HandlerSpec = HandlerSpec {
    key: "plain",
    summary: "PLAIN REDIRECT",
    description: "A simple redirect to the target URL.",
    required_options: &[],
};

/// Unconditional redirect to `target_url`, with the captured path remainder
/// appended.
#[derive(Debug, Clone)]
pub struct PlainRedirect {
    mapping: MappingDefinition,
}

impl PlainRedirect {
    pub fn from_mapping(mapping: &MappingDefinition) -> Result<Self, ValidationError> {
        require_options(&SPEC, mapping)?;
        Ok(Self {
            mapping: mapping.clone(),
        })
    }

    /// Registry entry for the default registry.
    pub fn entry() -> HandlerEntry {
        HandlerEntry {
            spec: SPEC,
            factory: Arc::new(|mapping| {
                Ok(Arc::new(PlainRedirect::from_mapping(mapping)?) as Arc<dyn RedirectHandler>)
            }),
        }
    }

    pub(crate) fn redirect_to(&self, path_remainder: Option<&str>) -> RedirectAction {
        RedirectAction {
            location: join_target(self.mapping.target_url.as_str(), path_remainder),
        }
    }
}

#[async_trait]
impl RedirectHandler for PlainRedirect {
    fn spec(&self) -> &HandlerSpec {
        &SPEC
    }

    fn mapping(&self) -> &MappingDefinition {
        &self.mapping
    }

    async fn handle(
        &self,
        method: &Method,
        path_remainder: Option<&str>,
    ) -> Result<RedirectAction, ProxyError> {
        let action = self.redirect_to(path_remainder);
        info!(%method, location = %action.location, "Redirecting");
        Ok(action)
    }
}

/// Append `remainder` to `base`, collapsing the slashes at the seam.
pub(crate) fn join_target(base: &str, remainder: Option<&str>) -> String {
    let rest = remainder.unwrap_or("").trim_start_matches('/');
    if rest.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), rest)
    }
}
