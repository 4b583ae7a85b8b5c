use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::group::{RouteEntry, RouteGroup, RoutePattern, method_filter};
use crate::config::{Config, ConfigError, ValidationError};
use crate::handlers::HandlerRegistry;
use axum::routing::MethodFilter;

/// The built routing table: one [`RouteGroup`] per distinct path pattern.
///
/// This is the composition root. `build` consumes a validated configuration,
/// instantiates every handler through the registry, and groups them by
/// normalized path pattern. The same configuration always yields the same
/// groups in the same order, with each group's handlers in declaration order.
pub struct RedirectRouter {
    groups: Vec<Arc<RouteGroup>>,
}

impl std::fmt::Debug for RedirectRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectRouter")
            .field("groups", &self.groups.len())
            .finish_non_exhaustive()
    }
}

impl RedirectRouter {
    pub fn build(config: &Config, registry: &HandlerRegistry) -> Result<Self, ConfigError> {
        let mut grouped: BTreeMap<String, (RoutePattern, Vec<RouteEntry>, Option<MethodFilter>)> =
            BTreeMap::new();

        for mapping in &config.targets {
            // Unknown keys are also rejected here for callers that skip
            // configuration validation
            let entry =
                registry
                    .lookup(&mapping.handler)
                    .map_err(|_| ValidationError::UnknownHandler {
                        handler: mapping.handler.clone(),
                        known: registry.known_keys().join(", "),
                    })?;

            let handler = (entry.factory)(mapping)?;
            let host = mapping
                .source_host()
                .ok_or_else(|| ValidationError::MissingHost {
                    url: mapping.source_url.to_string(),
                })?;
            let pattern = RoutePattern::parse(mapping.source_url.path())?;
            let filter = method_filter(&mapping.methods)?;

            debug!(
                pattern = %pattern.key(),
                host = %host,
                handler = %mapping.handler,
                "Registering mapping"
            );

            let slot = grouped
                .entry(pattern.key())
                .or_insert_with(|| (pattern, Vec::new(), None));
            slot.1.push(RouteEntry { host, handler });
            slot.2 = Some(slot.2.map_or(filter, |combined| combined.or(filter)));
        }

        let groups = grouped
            .into_values()
            .map(|(pattern, entries, methods)| {
                // methods is always set: every slot gets at least one mapping
                let methods = methods.unwrap_or(MethodFilter::GET);
                Arc::new(RouteGroup::new(pattern, entries, methods))
            })
            .collect();

        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[Arc<RouteGroup>] {
        &self.groups
    }
}
