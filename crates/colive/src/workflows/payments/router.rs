use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::ProofSubmission;
use super::repository::PaymentRepository;
use super::service::{PaymentError, PaymentService};
use crate::ids::{PaymentId, UserId};
use crate::workflows::onboarding::ColiverRepository;
use crate::workflows::todos::TodoRepository;

pub fn payment_router<S>(service: Arc<PaymentService<S>>) -> Router
where
    S: PaymentRepository + TodoRepository + ColiverRepository + 'static,
{
    Router::new()
        .route("/api/v1/payments", get(ledger_handler::<S>))
        .route("/api/v1/payments/:payment_id/proof", post(proof_handler::<S>))
        .route(
            "/api/v1/admin/payments/:payment_id/approve",
            post(approve_handler::<S>),
        )
        .route(
            "/api/v1/admin/payments/:payment_id/reject",
            post(reject_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LedgerQuery {
    user_id: String,
    today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProofRequest {
    user_id: String,
    #[serde(flatten)]
    proof: ProofSubmission,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApprovalRequest {
    #[serde(default)]
    admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RejectionRequest {
    note: String,
}

pub(crate) async fn ledger_handler<S>(
    State(service): State<Arc<PaymentService<S>>>,
    Query(query): Query<LedgerQuery>,
) -> Response
where
    S: PaymentRepository + TodoRepository + ColiverRepository + 'static,
{
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    match service.ledger_for_user(&UserId(query.user_id), today) {
        Ok(ledger) => (StatusCode::OK, axum::Json(ledger)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn proof_handler<S>(
    State(service): State<Arc<PaymentService<S>>>,
    Path(payment_id): Path<String>,
    axum::Json(request): axum::Json<ProofRequest>,
) -> Response
where
    S: PaymentRepository + TodoRepository + ColiverRepository + 'static,
{
    let result = service.submit_proof(
        &PaymentId(payment_id),
        &UserId(request.user_id),
        request.proof,
    );
    match result {
        Ok(payment) => (StatusCode::ACCEPTED, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_handler<S>(
    State(service): State<Arc<PaymentService<S>>>,
    Path(payment_id): Path<String>,
    axum::Json(request): axum::Json<ApprovalRequest>,
) -> Response
where
    S: PaymentRepository + TodoRepository + ColiverRepository + 'static,
{
    match service.approve(&PaymentId(payment_id), request.admin_notes) {
        Ok(payment) => (StatusCode::OK, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reject_handler<S>(
    State(service): State<Arc<PaymentService<S>>>,
    Path(payment_id): Path<String>,
    axum::Json(request): axum::Json<RejectionRequest>,
) -> Response
where
    S: PaymentRepository + TodoRepository + ColiverRepository + 'static,
{
    match service.reject(&PaymentId(payment_id), request.note) {
        Ok(payment) => (StatusCode::OK, axum::Json(payment)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: PaymentError) -> Response {
    let status = match &error {
        PaymentError::NotFound => StatusCode::NOT_FOUND,
        PaymentError::Forbidden => StatusCode::FORBIDDEN,
        PaymentError::DuplicateTransactionId(_) | PaymentError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        PaymentError::ProofNotAccepted(_) | PaymentError::MissingTransactionId => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PaymentError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
