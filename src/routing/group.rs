use axum::http::Method;
use axum::routing::MethodFilter;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::error::ProxyError;
use crate::config::ValidationError;
use crate::handlers::{RedirectAction, RedirectHandler};

/// Normalized path pattern from a mapping's `source_url`.
///
/// A trailing `*` segment captures the remainder of the request path for the
/// handler; everything else matches exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    prefix: String,
    wildcard: bool,
}

impl RoutePattern {
    pub fn parse(path: &str) -> Result<Self, ValidationError> {
        let raw = if path.is_empty() { "/" } else { path };

        let (prefix, wildcard) = match raw.strip_suffix("/*") {
            Some(stripped) => (stripped, true),
            None => (raw, false),
        };

        // Root stays "/", otherwise trailing slashes are dropped
        let prefix = if prefix.is_empty() {
            "/".to_string()
        } else {
            let trimmed = prefix.trim_end_matches('/');
            if trimmed.is_empty() {
                "/".to_string()
            } else {
                trimmed.to_string()
            }
        };

        if prefix.contains('*') {
            return Err(ValidationError::InvalidRoutePattern {
                path: path.to_string(),
            });
        }

        Ok(Self { prefix, wildcard })
    }

    /// Grouping key; distinguishes `/foo` from `/foo/*`.
    pub fn key(&self) -> String {
        if self.wildcard {
            if self.prefix == "/" {
                "/*".to_string()
            } else {
                format!("{}/*", self.prefix)
            }
        } else {
            self.prefix.clone()
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// The request-path portion captured by the wildcard, without the
    /// separating slash. `None` for exact patterns or an empty capture.
    pub fn remainder<'a>(&self, request_path: &'a str) -> Option<&'a str> {
        if !self.wildcard {
            return None;
        }
        let rest = request_path.strip_prefix(self.prefix.as_str())?;
        let rest = rest.trim_start_matches('/');
        if rest.is_empty() { None } else { Some(rest) }
    }
}

/// Union method filter for a set of configured method names.
pub fn method_filter(methods: &[String]) -> Result<MethodFilter, ValidationError> {
    let mut filter: Option<MethodFilter> = None;

    for method in methods {
        let single = match method.to_ascii_uppercase().as_str() {
            "GET" => MethodFilter::GET,
            "POST" => MethodFilter::POST,
            "PUT" => MethodFilter::PUT,
            "DELETE" => MethodFilter::DELETE,
            "HEAD" => MethodFilter::HEAD,
            "OPTIONS" => MethodFilter::OPTIONS,
            "PATCH" => MethodFilter::PATCH,
            "TRACE" => MethodFilter::TRACE,
            other => {
                return Err(ValidationError::UnsupportedMethod {
                    method: other.to_string(),
                });
            }
        };
        filter = Some(filter.map_or(single, |combined| combined.or(single)));
    }

    filter.ok_or(ValidationError::UnsupportedMethod {
        method: "(none)".to_string(),
    })
}

/// Request hostname without the port part of the authority.
pub fn normalize_host(authority: &str) -> &str {
    // IPv6 authorities keep their brackets: "[::1]:8080" -> "[::1]"
    if authority.starts_with('[') {
        if let Some(end) = authority.find(']') {
            return &authority[..=end];
        }
    }
    authority.split(':').next().unwrap_or(authority)
}

/// One configured mapping inside a group: the hostname it serves plus its
/// handler instance.
pub struct RouteEntry {
    pub host: String,
    pub handler: Arc<dyn RedirectHandler>,
}

/// All handlers sharing one path pattern, disambiguated by request hostname.
/// Built once at startup and shared read-only across requests.
pub struct RouteGroup {
    pattern: RoutePattern,
    entries: Vec<RouteEntry>,
    methods: MethodFilter,
}

impl RouteGroup {
    pub fn new(pattern: RoutePattern, entries: Vec<RouteEntry>, methods: MethodFilter) -> Self {
        Self {
            pattern,
            entries,
            methods,
        }
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Union of the methods declared across the group's mappings.
    pub fn method_filter(&self) -> MethodFilter {
        self.methods
    }

    /// Select the first entry whose hostname matches and run its handler.
    pub async fn dispatch(
        &self,
        method: &Method,
        host: &str,
        request_path: &str,
    ) -> Result<RedirectAction, ProxyError> {
        let host = normalize_host(host);
        let remainder = self.pattern.remainder(request_path);

        for entry in &self.entries {
            if entry.host.eq_ignore_ascii_case(host) {
                debug!(
                    host,
                    path = request_path,
                    target_url = %entry.handler.mapping().target_url,
                    "Dispatching"
                );
                return entry.handler.handle(method, remainder).await;
            }
        }

        warn!(host, path = request_path, "No matching handlers");
        Err(ProxyError::NoHandler(format!("{host}{request_path}")))
    }
}
