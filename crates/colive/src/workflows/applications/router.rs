use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::Local;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::availability::StayRequest;
use super::domain::{ApplicantDetails, ApplicationStatus};
use super::repository::{ApplicationRepository, ChapterRepository, QuestionRepository};
use super::service::{ApplicationService, ApplicationServiceError};
use super::wizard::{AnswerInput, ReintroductionDecision, WizardError};
use crate::ids::{ApplicationId, ChapterId, UserId};
use crate::storage::RepositoryError;
use crate::workflows::onboarding::ColiverRepository;
use crate::workflows::payments::PaymentRepository;
use crate::workflows::todos::TodoRepository;

/// Bounds every application handler needs from the backing store.
pub trait ApplicationStore:
    ApplicationRepository
    + ChapterRepository
    + QuestionRepository
    + ColiverRepository
    + PaymentRepository
    + TodoRepository
    + 'static
{
}

impl<T> ApplicationStore for T where
    T: ApplicationRepository
        + ChapterRepository
        + QuestionRepository
        + ColiverRepository
        + PaymentRepository
        + TodoRepository
        + 'static
{
}

/// Router exposing availability search, the application wizard, and admin transitions.
pub fn application_router<S>(service: Arc<ApplicationService<S>>) -> Router
where
    S: ApplicationStore,
{
    Router::new()
        .route("/api/v1/availability", post(availability_handler::<S>))
        .route(
            "/api/v1/applications",
            post(start_handler::<S>).get(list_handler::<S>),
        )
        .route("/api/v1/applications/:application_id", get(get_handler::<S>))
        .route(
            "/api/v1/applications/:application_id/chapter",
            post(chapter_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/answers",
            post(answer_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/reintroduction",
            post(reintroduction_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/resume",
            post(resume_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/details",
            put(details_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/withdraw",
            post(withdraw_handler::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/pricing",
            get(pricing_handler::<S>),
        )
        .route(
            "/api/v1/admin/applications/:application_id/status",
            post(status_handler::<S>),
        )
        .route(
            "/api/v1/admin/applications/:application_id/archive",
            post(archive_handler::<S>),
        )
        .route(
            "/api/v1/admin/applications/:application_id/manual-cost",
            post(manual_cost_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StartRequest {
    user_id: String,
    #[serde(flatten)]
    details: ApplicantDetails,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserQuery {
    user_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChapterSelection {
    chapter_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReintroductionRequest {
    decision: ReintroductionDecision,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusRequest {
    application_status: ApplicationStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArchiveRequest {
    active: bool,
}

/// `null` clears the override.
#[derive(Debug, Deserialize)]
pub(crate) struct ManualCostRequest {
    #[serde(default)]
    manual_cost: Option<Decimal>,
}

pub(crate) async fn availability_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    axum::Json(request): axum::Json<StayRequest>,
) -> Response {
    let today = Local::now().date_naive();
    match service.check_availability(&request, today) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn start_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    axum::Json(request): axum::Json<StartRequest>,
) -> Response {
    let today = Local::now().date_naive();
    match service.start(UserId(request.user_id), request.details, today) {
        Ok(view) => (StatusCode::CREATED, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    Query(query): Query<UserQuery>,
) -> Response {
    match service.list_for_user(&UserId(query.user_id)) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
) -> Response {
    match service.get(&ApplicationId(application_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn chapter_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
    axum::Json(selection): axum::Json<ChapterSelection>,
) -> Response {
    let result = service.select_chapter(
        &ApplicationId(application_id),
        ChapterId(selection.chapter_id),
    );
    match result {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn answer_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
    axum::Json(input): axum::Json<AnswerInput>,
) -> Response {
    match service.answer(&ApplicationId(application_id), input) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reintroduction_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ReintroductionRequest>,
) -> Response {
    match service.choose_reintroduction(&ApplicationId(application_id), request.decision) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn resume_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
) -> Response {
    match service.resume(&ApplicationId(application_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn details_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
    axum::Json(details): axum::Json<ApplicantDetails>,
) -> Response {
    let today = Local::now().date_naive();
    match service.update_details(&ApplicationId(application_id), details, today) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn withdraw_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
) -> Response {
    match service.withdraw(&ApplicationId(application_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn pricing_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
) -> Response {
    match service.pricing(&ApplicationId(application_id)) {
        Ok(pricing) => (StatusCode::OK, axum::Json(pricing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<StatusRequest>,
) -> Response {
    let result =
        service.set_application_status(&ApplicationId(application_id), request.application_status);
    match result {
        Ok(change) => (StatusCode::OK, axum::Json(change)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn archive_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ArchiveRequest>,
) -> Response {
    match service.set_active(&ApplicationId(application_id), request.active) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn manual_cost_handler<S: ApplicationStore>(
    State(service): State<Arc<ApplicationService<S>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ManualCostRequest>,
) -> Response {
    match service.set_manual_cost(&ApplicationId(application_id), request.manual_cost) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ApplicationServiceError) -> Response {
    match error {
        ApplicationServiceError::Validation(validation) => {
            let payload = json!({
                "error": validation.to_string(),
                "fields": validation.errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        ApplicationServiceError::Wizard(error @ WizardError::NotEditable(_)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        ApplicationServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "application not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        ApplicationServiceError::Repository(RepositoryError::Conflict)
        | ApplicationServiceError::ChapterUnavailable(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        ApplicationServiceError::Wizard(_) | ApplicationServiceError::UnknownChapter(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
