use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::pricing::MemberType;
use crate::workflows::applications::application_router;

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn start_body() -> Value {
    json!({
        "user_id": "usr-jiwoo",
        "first_name": "Jiwoo",
        "last_name": "Park",
        "email": "jiwoo@example.com",
        "date_join": join(),
        "date_leave": leave(),
        "guests": 1,
        "member_type": "new"
    })
}

#[tokio::test]
async fn availability_endpoint_lists_chapters() {
    let (service, _store) = build_service();
    let router = application_router(Arc::new(service));

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/availability",
            json!({ "date_join": join(), "date_leave": leave(), "guests": 2 }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["nights"], 31);
    assert_eq!(body["options"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn availability_endpoint_reports_field_errors() {
    let (service, _store) = build_service();
    let router = application_router(Arc::new(service));

    let response = router
        .oneshot(json_request(
            Method::POST,
            "/api/v1/availability",
            json!({ "date_join": leave(), "date_leave": join() }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["fields"][0]["field"], "date_leave");
    assert_eq!(body["error"], "Leave date must be after join date.");
}

#[tokio::test]
async fn start_then_select_chapter_over_http() {
    let (service, _store) = build_service();
    let router = application_router(Arc::new(service));

    let response = router
        .clone()
        .oneshot(json_request(Method::POST, "/api/v1/applications", start_body()))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json_body(response).await;
    assert_eq!(created["step"]["kind"], "chapter_selection");
    let id = created["application_id"].as_str().expect("id").to_string();

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/applications/{id}/chapter"),
            json!({ "chapter_id": "chp-seoul" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["step"], json!({ "kind": "questions", "index": 0 }));
    assert_eq!(body["progress"], json!({ "current": 1, "total": 2 }));

    let response = router
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/applications/{id}/answers"),
            json!({ "answer": "" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_application_returns_not_found() {
    let (service, _store) = build_service();
    let router = application_router(Arc::new(service));

    let response = router
        .oneshot(empty_request(Method::GET, "/api/v1/applications/app-missing"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn withdrawn_application_cannot_be_withdrawn_again() {
    let (service, _store) = build_service();
    let view = started(&service, MemberType::New);
    let router = application_router(Arc::new(service));
    let uri = format!("/api/v1/applications/{}/withdraw", view.application_id);

    let first = router
        .clone()
        .oneshot(empty_request(Method::POST, &uri))
        .await
        .expect("response");
    assert_eq!(first.status(), StatusCode::OK);

    let second = router
        .oneshot(empty_request(Method::POST, &uri))
        .await
        .expect("response");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn listing_filters_by_user() {
    let (service, _store) = build_service();
    started(&service, MemberType::New);
    let router = application_router(Arc::new(service));

    let response = router
        .clone()
        .oneshot(empty_request(
            Method::GET,
            "/api/v1/applications?user_id=usr-jiwoo",
        ))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let response = router
        .oneshot(empty_request(
            Method::GET,
            "/api/v1/applications?user_id=usr-someone-else",
        ))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn admin_status_change_reports_onboarding() {
    let (service, _store) = build_service();
    let view = started(&service, MemberType::New);
    let router = application_router(Arc::new(service));
    let id = view.application_id.to_string();

    router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/applications/{id}/chapter"),
            json!({ "chapter_id": "chp-seoul" }),
        ))
        .await
        .expect("response");

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/admin/applications/{id}/status"),
            json!({ "application_status": "onboarding" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["application"]["application_status"], "Onboarding");
    assert_eq!(body["onboarding"]["coliver_created"], true);
    assert_eq!(
        body["onboarding"]["payments_created"]
            .as_array()
            .map(Vec::len),
        Some(1)
    );

    let response = router
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/applications/{id}/pricing"),
        ))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body["total_nights"], 31);
}

#[tokio::test]
async fn question_screen_shows_question_and_prefilled_answer() {
    let (service, _store) = build_service();
    let view = started(&service, MemberType::New);
    let router = application_router(Arc::new(service));
    let id = view.application_id.to_string();

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/applications/{id}/chapter"),
            json!({ "chapter_id": "chp-seoul" }),
        ))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body["question"]["id"], "q-why");
    assert_eq!(body["question"]["kind"], "text");
    assert!(body.get("answer").is_none());

    router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/applications/{id}/answers"),
            json!({ "answer": "community" }),
        ))
        .await
        .expect("response");
    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/applications/{id}/answers"),
            json!({ "answer": "", "navigation": "previous" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["step"], json!({ "kind": "questions", "index": 0 }));
    assert_eq!(body["question"]["id"], "q-why");
    assert_eq!(body["answer"], "community");

    let response = router
        .oneshot(empty_request(Method::GET, &format!("/api/v1/applications/{id}")))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body["answer"], "community");
}

#[tokio::test]
async fn admin_manual_cost_overrides_pricing() {
    let (service, _store) = build_service();
    let view = started(&service, MemberType::New);
    let router = application_router(Arc::new(service));
    let id = view.application_id.to_string();

    router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/applications/{id}/chapter"),
            json!({ "chapter_id": "chp-seoul" }),
        ))
        .await
        .expect("response");

    let response = router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/admin/applications/{id}/manual-cost"),
            json!({ "manual_cost": "450000" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/applications/{id}/pricing"),
        ))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body["manual_override"], true);
    assert_eq!(
        body["final_total"]
            .as_str()
            .and_then(|total| total.parse::<Decimal>().ok()),
        Some(Decimal::from(450_000))
    );

    router
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/admin/applications/{id}/manual-cost"),
            json!({ "manual_cost": null }),
        ))
        .await
        .expect("response");
    let response = router
        .oneshot(empty_request(
            Method::GET,
            &format!("/api/v1/applications/{id}/pricing"),
        ))
        .await
        .expect("response");
    let body = read_json_body(response).await;
    assert_eq!(body["manual_override"], false);
}
