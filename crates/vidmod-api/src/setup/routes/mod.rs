//! Route configuration and setup.
//!
//! Domain route groups live in [domains](domains); the health check in [health](health).

mod domains;
pub(crate) mod health;

use crate::constants::{MULTIPART_OVERHEAD_BYTES, UPLOADS_PATH};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vidmod_core::Config;
use vidmod_infra::{request_id_middleware, security_headers_middleware};

const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let protected_routes = protected_routes(state.clone()).route_layer(
        axum::middleware::from_fn_with_state(state.clone(), crate::auth::auth_middleware),
    );
    let app_state_routes = public_routes(state.clone()).merge(protected_routes);

    let body_limit = config.max_file_size_bytes() + MULTIPART_OVERHEAD_BYTES;
    tracing::info!(
        body_limit_bytes = body_limit,
        http_concurrency_limit = HTTP_CONCURRENCY_LIMIT,
        uploads_root = %config.upload_path().display(),
        "HTTP limits configured"
    );

    let app = app_state_routes
        .nest_service(UPLOADS_PATH, ServeDir::new(config.upload_path()))
        .nest(
            "/docs",
            utoipa_rapidoc::RapiDoc::new("/api/openapi.json")
                .path("/docs")
                .into(),
        )
        .fallback(handlers::root::not_found)
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn(security_headers_middleware))
        .with_state(state);

    Ok(app)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins - not recommended for production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

fn public_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(domains::public_auth_routes(state.clone()))
        .with_state(state)
}

fn protected_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .merge(domains::auth_routes(state.clone()))
        .merge(domains::video_routes(state.clone()))
        .merge(domains::organization_routes(state.clone()))
        .with_state(state)
}
