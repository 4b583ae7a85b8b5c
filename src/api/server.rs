use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::header;
use axum::response::{Html, Redirect};
use axum::routing::{MethodRouter, get, on};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::error::ProxyError;
use super::pages;
use crate::cli::ServerArgs;
use crate::config::Config;
use crate::handlers::HandlerRegistry;
use crate::observability::Metrics;
use crate::routing::RedirectRouter;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(args: ServerArgs) -> Result<(), AnyError> {
    let registry = HandlerRegistry::with_defaults();

    info!("Loading configuration");
    let config = Config::load(args.config, &registry)
        .map_err(|e| format!("Failed to load config: {e}"))?;

    let router = RedirectRouter::build(&config, &registry)
        .map_err(|e| format!("Failed to build routing table: {e}"))?;

    let metrics = Arc::new(Metrics::new());
    let app = build_app(&router, metrics);

    let address = args.address.unwrap_or(config.server.bind_addr);
    let listener = TcpListener::bind(address).await?;
    info!(%address, targets = config.targets.len(), "wakegate listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the axum application from the routing table.
///
/// Each route group becomes one dispatch point restricted to the group's
/// method union; wildcard patterns register both `{prefix}/{*rest}` and the
/// bare prefix (empty remainder). The listing, root, and health routes are
/// only added where the configuration does not claim the path.
pub fn build_app(router: &RedirectRouter, metrics: Arc<Metrics>) -> Router {
    let mut app = Router::new();
    let mut claimed: HashSet<String> = HashSet::new();

    let exact_paths: HashSet<&str> = router
        .groups()
        .iter()
        .filter(|group| !group.pattern().is_wildcard())
        .map(|group| group.pattern().prefix())
        .collect();

    for group in router.groups() {
        let route = dispatch_route(group.clone(), metrics.clone());
        let pattern = group.pattern();

        if pattern.is_wildcard() {
            let wildcard_path = if pattern.prefix() == "/" {
                "/{*rest}".to_string()
            } else {
                format!("{}/{{*rest}}", pattern.prefix())
            };
            app = app.route(&wildcard_path, route.clone());
            claimed.insert(wildcard_path);

            if !exact_paths.contains(pattern.prefix()) {
                app = app.route(pattern.prefix(), route);
                claimed.insert(pattern.prefix().to_string());
            }
        } else {
            app = app.route(pattern.prefix(), route);
            claimed.insert(pattern.prefix().to_string());
        }
    }

    if !claimed.contains("/routes") {
        let page = Arc::new(pages::render_routes(router));
        app = app.route(
            "/routes",
            get(move || {
                let page = Arc::clone(&page);
                async move { Html(page.as_ref().clone()) }
            }),
        );
    }
    if !claimed.contains("/") {
        app = app.route("/", get(pages::index));
    }
    if !claimed.contains("/health") {
        app = app.route("/health", get(pages::health));
    }

    app.fallback(unmatched_path)
        .layer(TraceLayer::new_for_http())
}

fn dispatch_route(
    group: Arc<crate::routing::RouteGroup>,
    metrics: Arc<Metrics>,
) -> MethodRouter {
    on(group.method_filter(), move |request: Request| {
        let group = Arc::clone(&group);
        let metrics = Arc::clone(&metrics);
        async move { dispatch(group, metrics, request).await }
    })
}

async fn dispatch(
    group: Arc<crate::routing::RouteGroup>,
    metrics: Arc<Metrics>,
    request: Request,
) -> Result<Redirect, ProxyError> {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let host = request_host(&request).ok_or_else(|| ProxyError::NoHandler(path.clone()))?;

    match group.dispatch(&method, &host, &path).await {
        Ok(action) => {
            metrics.redirect_served();
            Ok(Redirect::temporary(&action.location))
        }
        Err(err) => {
            match &err {
                ProxyError::HostUnreachable { .. } => metrics.wake_timeout(),
                ProxyError::NoHandler(_) => metrics.unmatched_host(),
                ProxyError::Internal(_) => metrics.internal_error(),
            }
            Err(err)
        }
    }
}

/// Requesting authority: the Host header, or the URI authority for HTTP/2
/// requests that carry it there.
fn request_host(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
}

async fn unmatched_path(request: Request) -> ProxyError {
    ProxyError::NoHandler(request.uri().path().to_string())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())
            .expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
