use crate::infra::{AppState, Services};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use colive::workflows::applications::application_router;
use colive::workflows::onboarding::residency_router;
use colive::workflows::payments::payment_router;
use colive::workflows::requests::request_router;
use colive::workflows::todos::todo_router;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_colive_routes(services: &Services) -> axum::Router {
    application_router(Arc::clone(&services.applications))
        .merge(payment_router(Arc::clone(&services.payments)))
        .merge(residency_router(Arc::clone(&services.residency)))
        .merge(todo_router(Arc::clone(&services.todos)))
        .merge(request_router(Arc::clone(&services.requests)))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
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
