use crate::infra::{AppState, Services};
use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json, Router};
use pet_adoption::adoption::adoption_router;
use pet_adoption::auth::{auth_router, SharedSessionResolver};
use pet_adoption::catalog::catalog_router;
use pet_adoption::config::CorsConfig;
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Every API route plus the operational endpoints, with the session resolver
/// installed for the `Caller` extractors and CORS answered for browser clients.
pub(crate) fn with_application_routes(services: &Services, cors: &CorsConfig) -> Router {
    let resolver: SharedSessionResolver = services.auth.clone();

    Router::new()
        .route("/", axum::routing::get(root))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .merge(auth_router(services.auth.clone()))
        .merge(catalog_router(services.catalog.clone()))
        .merge(adoption_router(services.adoption.clone()))
        .layer(Extension(resolver))
        .layer(cors_layer(cors))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(config.allowed_origins.iter().cloned())
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

pub(crate) async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Pet Adoption API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Acquire);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
