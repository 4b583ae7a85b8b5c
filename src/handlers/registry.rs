use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use super::traits::{HandlerSpec, RedirectHandler};
use crate::config::{MappingDefinition, ValidationError};

/// Constructs a handler instance from a mapping definition.
///
/// Boxed closures rather than fn pointers so alternative transports can be
/// injected when registering handler variants in tests.
pub type HandlerFactory =
    Arc<dyn Fn(&MappingDefinition) -> Result<Arc<dyn RedirectHandler>, ValidationError> + Send + Sync>;

/// One registered handler variant: its metadata plus its constructor.
#[derive(Clone)]
pub struct HandlerEntry {
    pub spec: HandlerSpec,
    pub factory: HandlerFactory,
}

impl std::fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("handler not found: {0}")]
    NotFound(String),
}

/// Registry mapping handler type keys to factories.
///
/// Populated once at startup (`with_defaults`, plus explicit `register`
/// calls); read-only afterwards by convention and shared across requests.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    entries: BTreeMap<String, HandlerEntry>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register a handler variant under its spec key.
    /// The last registration for a key wins.
    pub fn register(&mut self, entry: HandlerEntry) {
        self.entries.insert(entry.spec.key.to_string(), entry);
    }

    pub fn lookup(&self, key: &str) -> Result<&HandlerEntry, RegistryError> {
        self.entries
            .get(key)
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))
    }

    pub fn is_known(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Registered keys, sorted. Used in unknown-handler error messages.
    pub fn known_keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Handler metadata for the `list-handlers` introspection command.
    pub fn specs(&self) -> impl Iterator<Item = &HandlerSpec> {
        self.entries.values().map(|entry| &entry.spec)
    }

    /// Create the default registry with the built-in handler variants.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(super::plain::PlainRedirect::entry());
        registry.register(super::wol::WolRedirect::entry());
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::PlainRedirect;

    #[test]
    fn test_with_defaults_registers_builtin_handlers() {
        let registry = HandlerRegistry::with_defaults();
        assert!(registry.is_known("plain"));
        assert!(registry.is_known("wol"));
        assert_eq!(registry.known_keys(), vec!["plain", "wol"]);
    }

    #[test]
    fn test_lookup_unknown_key() {
        let registry = HandlerRegistry::with_defaults();
        let err = registry.lookup("teleport").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(key) if key == "teleport"));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = HandlerRegistry::with_defaults();

        let mut replacement = PlainRedirect::entry();
        replacement.spec = HandlerSpec {
            key: "plain",
            summary: "REPLACED",
            description: "replacement for the plain handler",
            required_options: &[],
        };
        registry.register(replacement);

        assert_eq!(registry.lookup("plain").unwrap().spec.summary, "REPLACED");
        assert_eq!(registry.known_keys().len(), 2);
    }

    #[test]
    fn test_wol_requires_mac_and_timeout() {
        let registry = HandlerRegistry::with_defaults();
        let spec = registry.lookup("wol").unwrap().spec;
        assert_eq!(spec.required_options, &["mac", "timeout_s"]);
    }
}
