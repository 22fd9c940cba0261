use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{NewMaintenanceRequest, NewTransferRequest, TransferDecision};
use super::repository::RequestRepository;
use super::service::{RequestError, RequestService};
use crate::ids::{MaintenanceId, TransferId};
use crate::workflows::applications::ChapterRepository;
use crate::workflows::onboarding::ColiverRepository;
use crate::workflows::todos::TodoRepository;

pub fn request_router<S>(service: Arc<RequestService<S>>) -> Router
where
    S: RequestRepository + ChapterRepository + ColiverRepository + TodoRepository + 'static,
{
    Router::new()
        .route("/api/v1/maintenance", post(create_maintenance_handler::<S>))
        .route(
            "/api/v1/admin/maintenance/:request_id/complete",
            post(complete_maintenance_handler::<S>),
        )
        .route("/api/v1/transfers", post(create_transfer_handler::<S>))
        .route(
            "/api/v1/admin/transfers/:request_id/decision",
            post(decide_transfer_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CompletionRequest {
    #[serde(default)]
    manager_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecisionRequest {
    decision: TransferDecision,
    #[serde(default)]
    admin_notes: Option<String>,
}

pub(crate) async fn create_maintenance_handler<S>(
    State(service): State<Arc<RequestService<S>>>,
    axum::Json(request): axum::Json<NewMaintenanceRequest>,
) -> Response
where
    S: RequestRepository + ChapterRepository + ColiverRepository + TodoRepository + 'static,
{
    match service.create_maintenance(request) {
        Ok(created) => (StatusCode::CREATED, axum::Json(created)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn complete_maintenance_handler<S>(
    State(service): State<Arc<RequestService<S>>>,
    Path(request_id): Path<String>,
    axum::Json(request): axum::Json<CompletionRequest>,
) -> Response
where
    S: RequestRepository + ChapterRepository + ColiverRepository + TodoRepository + 'static,
{
    match service.complete_maintenance(&MaintenanceId(request_id), request.manager_notes) {
        Ok(completed) => (StatusCode::OK, axum::Json(completed)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_transfer_handler<S>(
    State(service): State<Arc<RequestService<S>>>,
    axum::Json(request): axum::Json<NewTransferRequest>,
) -> Response
where
    S: RequestRepository + ChapterRepository + ColiverRepository + TodoRepository + 'static,
{
    match service.create_transfer(request) {
        Ok(created) => (StatusCode::CREATED, axum::Json(created)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decide_transfer_handler<S>(
    State(service): State<Arc<RequestService<S>>>,
    Path(request_id): Path<String>,
    axum::Json(request): axum::Json<DecisionRequest>,
) -> Response
where
    S: RequestRepository + ChapterRepository + ColiverRepository + TodoRepository + 'static,
{
    match service.decide_transfer(&TransferId(request_id), request.decision, request.admin_notes) {
        Ok(decided) => (StatusCode::OK, axum::Json(decided)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: RequestError) -> Response {
    let status = match &error {
        RequestError::NotFound => StatusCode::NOT_FOUND,
        RequestError::AlreadyResolved => StatusCode::CONFLICT,
        RequestError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
