use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};

use crate::routing::RedirectRouter;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// The root path points visitors at the routes listing.
pub async fn index() -> Redirect {
    Redirect::temporary("/routes")
}

/// Human-readable listing of the configured routes, one entry per mapping.
pub fn render_routes(router: &RedirectRouter) -> String {
    let mut items = String::new();
    for group in router.groups() {
        for entry in group.entries() {
            let mapping = entry.handler.mapping();
            items.push_str(&format!(
                "<li><b>{}</b>: [ {} ] &rarr; [ {} ]</li>\n",
                entry.handler.spec().summary,
                mapping.source_url,
                mapping.target_url,
            ));
        }
    }

    format!(
        "<html><head><title>wakegate</title></head><body>\
<h1>Configured routes</h1>\n<ol>\n{items}</ol>\n</body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::models::{Config, MappingDefinition, ServerConfig};
    use crate::handlers::HandlerRegistry;

    #[test]
    fn test_render_routes_lists_every_mapping() {
        let config = Config {
            server: ServerConfig::default(),
            targets: vec![
                MappingDefinition {
                    source_url: "http://a.local/x".parse().unwrap(),
                    target_url: "http://backend-a.lan:9000".parse().unwrap(),
                    handler: "plain".to_string(),
                    methods: vec!["GET".to_string()],
                    options: Default::default(),
                },
                MappingDefinition {
                    source_url: "http://b.local/y".parse().unwrap(),
                    target_url: "http://backend-b.lan:9000".parse().unwrap(),
                    handler: "plain".to_string(),
                    methods: vec!["GET".to_string()],
                    options: Default::default(),
                },
            ],
        };

        let registry = HandlerRegistry::with_defaults();
        let router = RedirectRouter::build(&config, &registry).unwrap();
        let page = render_routes(&router);

        assert!(page.contains("http://a.local/x"));
        assert!(page.contains("http://backend-b.lan:9000"));
        assert!(page.contains("PLAIN REDIRECT"));
    }
}
