use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tower::ServiceExt;

use super::*;
use crate::ids::{ChapterId, ColiverId, MaintenanceId, UserId};
use crate::pricing::Chapter;
use crate::storage::InMemoryStore;
use crate::workflows::onboarding::{Coliver, ColiverRepository, ColiverStatus};
use crate::workflows::todos::{TaskType, TodoRepository, TodoStatus};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn service() -> (RequestService<InMemoryStore>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    for (id, name) in [("chp-seoul", "Seoul"), ("chp-busan", "Busan")] {
        store
            .put_chapter(Chapter::flat(ChapterId::from(id), name, Decimal::from(20_000)))
            .expect("chapter");
    }
    store
        .upsert_coliver(
            Coliver {
                id: ColiverId::from("col-mina"),
                user_id: UserId::from("usr-mina"),
                first_name: "Mina".to_string(),
                last_name: "Kim".to_string(),
                email: "mina@example.com".to_string(),
                arrival_date: date(2025, 3, 1),
                departure_date: date(2025, 6, 1),
                chapter_id: Some(ChapterId::from("chp-seoul")),
                manual_cost: None,
                is_active: true,
                status: ColiverStatus::Coliving,
                created_at: Utc::now(),
            },
            &|_: &mut Coliver| {},
        )
        .expect("coliver");
    (RequestService::new(Arc::clone(&store)), store)
}

fn maintenance(confirmed: bool) -> NewMaintenanceRequest {
    NewMaintenanceRequest {
        user_id: UserId::from("usr-mina"),
        title: "Broken heater".to_string(),
        description: "Room 3 heater does not turn on".to_string(),
        user_confirmation: confirmed,
    }
}

fn transfer(current: &str, requested: &str) -> NewTransferRequest {
    NewTransferRequest {
        user_id: UserId::from("usr-mina"),
        current_chapter: ChapterId::from(current),
        requested_chapter: ChapterId::from(requested),
        start_date: date(2025, 4, 1),
        end_date: date(2025, 4, 10),
        reason: "Visiting family".to_string(),
        acknowledgment: true,
    }
}

#[test]
fn maintenance_requires_confirmation() {
    let (service, _store) = service();
    let result = service.create_maintenance(maintenance(false));
    assert!(matches!(result, Err(RequestError::Unconfirmed)));
}

#[test]
fn maintenance_lifecycle_updates_todos() {
    let (service, store) = service();
    let created = service
        .create_maintenance(maintenance(true))
        .expect("created");

    let todos = store
        .todos_for(TaskType::MaintenanceReview, created.id.as_str())
        .expect("todos");
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].coliver_name.as_deref(), Some("Mina Kim"));

    let completed = service
        .complete_maintenance(&created.id, Some("Replaced the fuse".to_string()))
        .expect("completed");
    assert_eq!(completed.status, MaintenanceStatus::Completed);
    assert_eq!(completed.manager_notes.as_deref(), Some("Replaced the fuse"));

    let todos = store
        .todos_for(TaskType::MaintenanceReview, created.id.as_str())
        .expect("todos");
    assert_eq!(todos[0].status, TodoStatus::Completed);

    let again = service.complete_maintenance(&created.id, None);
    assert!(matches!(again, Err(RequestError::AlreadyResolved)));
}

#[test]
fn transfer_validation() {
    let (service, _store) = service();

    let mut unacknowledged = transfer("chp-seoul", "chp-busan");
    unacknowledged.acknowledgment = false;
    assert!(matches!(
        service.create_transfer(unacknowledged),
        Err(RequestError::NotAcknowledged)
    ));

    assert!(matches!(
        service.create_transfer(transfer("chp-seoul", "chp-seoul")),
        Err(RequestError::SameChapter)
    ));

    let mut backwards = transfer("chp-seoul", "chp-busan");
    backwards.end_date = backwards.start_date;
    assert!(matches!(
        service.create_transfer(backwards),
        Err(RequestError::InvalidDates)
    ));

    assert!(matches!(
        service.create_transfer(transfer("chp-seoul", "chp-jeju")),
        Err(RequestError::UnknownChapter(_))
    ));
}

#[test]
fn approving_transfer_raises_followup() {
    let (service, store) = service();
    let created = service
        .create_transfer(transfer("chp-seoul", "chp-busan"))
        .expect("created");
    assert_eq!(created.status, TransferStatus::Pending);

    let review = store
        .todos_for(TaskType::TransferReview, created.id.as_str())
        .expect("todos");
    assert_eq!(review.len(), 1);
    assert!(review[0].description.contains("From: Seoul"));

    let decided = service
        .decide_transfer(&created.id, TransferDecision::Approve, Some("Enjoy".to_string()))
        .expect("decided");
    assert_eq!(decided.status, TransferStatus::Approved);

    let followup = store
        .todos_for(TaskType::TransferReview, &format!("{}_admin", created.id))
        .expect("todos");
    assert_eq!(followup.len(), 1);
    assert!(followup[0].is_pending());

    let again = service.decide_transfer(&created.id, TransferDecision::Reject, None);
    assert!(matches!(again, Err(RequestError::AlreadyResolved)));
}

#[tokio::test]
async fn router_maps_request_errors() {
    let (service, _store) = service();
    let router = request_router(Arc::new(service));

    let created = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/maintenance")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "user_id": "usr-mina",
                        "title": "Broken heater",
                        "description": "Room 3",
                        "user_confirmation": true
                    })
                    .to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(created.status(), StatusCode::CREATED);

    let unconfirmed = router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/maintenance")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({ "user_id": "usr-mina", "title": "x", "description": "y" }).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(unconfirmed.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let missing = router
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(format!(
                    "/api/v1/admin/maintenance/{}/complete",
                    MaintenanceId::from("mnt-missing")
                ))
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
