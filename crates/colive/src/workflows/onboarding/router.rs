use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::coliver::{Coliver, ColiverRepository};
use super::residency::ResidencyService;
use super::service::OnboardingError;
use crate::ids::{ColiverId, TemplateId};
use crate::storage::RepositoryError;
use crate::workflows::applications::ChapterRepository;
use crate::workflows::payments::PaymentRepository;
use crate::workflows::todos::TodoRepository;

pub fn residency_router<S>(service: Arc<ResidencyService<S>>) -> Router
where
    S: ChapterRepository + ColiverRepository + PaymentRepository + TodoRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/admin/payments/generate",
            post(generate_handler::<S>),
        )
        .route(
            "/api/v1/admin/colivers/:coliver_id",
            get(coliver_handler::<S>).put(update_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateRequest {
    #[serde(default)]
    template_id: Option<String>,
    #[serde(default)]
    dry_run: bool,
}

pub(crate) async fn generate_handler<S>(
    State(service): State<Arc<ResidencyService<S>>>,
    axum::Json(request): axum::Json<GenerateRequest>,
) -> Response
where
    S: ChapterRepository + ColiverRepository + PaymentRepository + TodoRepository + 'static,
{
    let template = request.template_id.map(TemplateId);
    match service.generate_for_active_colivers(template.as_ref(), request.dry_run) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn coliver_handler<S>(
    State(service): State<Arc<ResidencyService<S>>>,
    Path(coliver_id): Path<String>,
) -> Response
where
    S: ChapterRepository + ColiverRepository + PaymentRepository + TodoRepository + 'static,
{
    match service.coliver(&ColiverId(coliver_id)) {
        Ok(coliver) => (StatusCode::OK, axum::Json(coliver)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<S>(
    State(service): State<Arc<ResidencyService<S>>>,
    Path(coliver_id): Path<String>,
    axum::Json(mut coliver): axum::Json<Coliver>,
) -> Response
where
    S: ChapterRepository + ColiverRepository + PaymentRepository + TodoRepository + 'static,
{
    coliver.id = ColiverId(coliver_id);
    match service.update_coliver(coliver) {
        Ok(update) => (StatusCode::OK, axum::Json(update)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: OnboardingError) -> Response {
    let status = match &error {
        OnboardingError::ColiverNotFound(_)
        | OnboardingError::TemplateNotFound(_)
        | OnboardingError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        OnboardingError::Template(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
