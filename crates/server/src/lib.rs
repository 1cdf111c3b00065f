//! medibusca-server library crate
//!
//! Exposes `build_app`, `load_directory` and `config` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

mod ai;
pub mod config;
mod error;
mod middleware;
mod routes;
pub mod upstream;

use std::time::Duration;

use axum::{Extension, Router, middleware as axum_mw, routing::get};
use medibusca_core::{CoreError, Directory};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::{Config, DirectorySource};
use middleware::ApiKeyAuth;
use upstream::UpstreamClient;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    upstream: Option<UpstreamClient>,
    ai_configured: bool,
    ai_timeout: Duration,
    catalog_timeout: Duration,
}

/// Load the dataset behind the embedded directory routes
pub fn load_directory(source: &DirectorySource) -> Result<Directory, CoreError> {
    match source {
        DirectorySource::Sample => Ok(Directory::sample()),
        DirectorySource::File(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CoreError::Dataset(format!("{}: {}", path, e)))?;
            Directory::from_json(&text)
        }
    }
}

fn claude_client(config: &Config) -> Option<ai::ClaudeClient> {
    let key = config.anthropic_api_key.as_ref()?;
    let mut client = ai::ClaudeClient::new(key.clone());
    if let Some(base_url) = &config.anthropic_base_url {
        client = client.with_base_url(base_url.clone());
    }
    if let Some(model) = &config.anthropic_model {
        client = client.with_model(model.clone());
    }
    Some(client)
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port. The directory routes are mounted only
/// when a dataset is given.
pub fn build_app(config: &Config, directory: Option<Directory>) -> Router {
    let auth = ApiKeyAuth::new(config.api_key.clone());
    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    // None if ANTHROPIC_API_KEY not set
    let claude_client = claude_client(config);

    let state = AppState {
        upstream: config
            .upstream_api_url
            .as_ref()
            .map(|url| UpstreamClient::new(url.clone(), config.upstream_timeout)),
        ai_configured: claude_client.is_some(),
        ai_timeout: config.ai_timeout,
        catalog_timeout: config.catalog_timeout,
    };

    let api_routes = routes::api_routes()
        .layer(axum_mw::from_fn(middleware::auth_middleware))
        .layer(Extension(auth))
        .layer(Extension(claude_client))
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    // build_recorder() + set_global_recorder() so that repeated calls
    // (e.g. in integration tests) don't panic; the second install is
    // ignored and we still get a valid handle for /metrics.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    let public_routes = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let mut app = Router::new()
        .nest("/api", api_routes)
        .merge(public_routes)
        .with_state(state);
    if let Some(directory) = directory {
        app = app.merge(routes::directory::directory_routes(directory));
    }

    app.layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
