//! HTTP routes for Tally
//!
//! This module defines all HTTP endpoints exposed by the service.

pub mod health;
pub mod metrics;
pub mod tokenize;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{config::CorsPolicy, docs::ApiDoc, AppState};

/// Build the CORS layer for a policy
///
/// Browsers reject a wildcard origin on credentialed requests, so the
/// permissive policy echoes the caller's origin, method and headers instead.
pub fn cors_layer(policy: CorsPolicy) -> Option<CorsLayer> {
    match policy {
        CorsPolicy::Permissive => Some(
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true),
        ),
        CorsPolicy::Disabled => None,
    }
}

/// Raw OpenAPI document
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = match state.config.max_upload_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    let tokenize_routes = Router::new()
        .route("/tokenize-text", post(tokenize::tokenize_text))
        .route("/tokenize-file", post(tokenize::tokenize_file))
        .layer(body_limit);

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/openapi.json", get(openapi_json));

    let router = Router::new()
        .merge(public_routes)
        .merge(tokenize_routes)
        // Global middleware (applied to all routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    let router = match cors_layer(state.config.cors) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}
