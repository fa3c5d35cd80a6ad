use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::workflows::trust::repository::TrustScoreRepository;
use crate::workflows::trust::router::score_handler;
use crate::workflows::trust::{trust_router, TrustScoreService};

#[tokio::test]
async fn score_route_returns_not_found_for_unscored_buyer() {
    let (service, _) = build_service();
    let router = trust_router(service);

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/buyers/buyer-1/trust")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recalculate_route_returns_the_fresh_view() {
    let (service, _) = build_service();
    let router = trust_router(service);

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/buyers/buyer-1/trust/recalculate")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("overall_score"), Some(&json!(61)));
    assert_eq!(payload.get("risk_level"), Some(&json!("MEDIUM")));
    assert_eq!(payload.get("score_version"), Some(&json!(1)));
    assert!(payload.get("risk_category").is_none());
}

#[tokio::test]
async fn flag_route_creates_and_returns_the_flag() {
    let (service, store) = build_service();
    let router = trust_router(service);

    let body = json!({
        "flag_type": "PolicyViolation",
        "severity": "Medium",
        "description": "Resale outside the agreed territory"
    });
    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/buyers/buyer-1/trust/flags")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("flag_type"), Some(&json!("PolicyViolation")));
    assert_eq!(payload.get("status"), Some(&json!("Active")));

    let stored = store.flags(&buyer("buyer-1")).expect("flags readable");
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn event_route_reports_created_flags() {
    let (service, _) = build_service();
    let router = trust_router(service);

    let body = json!({
        "event": "PAYMENT_OVERDUE",
        "transaction_id": "tx-1",
        "days_overdue": 45
    });
    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/buyers/buyer-1/trust/events")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json_body(response).await;
    let created = payload
        .get("flags_created")
        .and_then(serde_json::Value::as_array)
        .expect("flag array");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].get("flag_type"), Some(&json!("PaymentDelay")));
}

#[tokio::test]
async fn score_handler_reports_unavailable_stores_as_internal_errors() {
    let service = Arc::new(TrustScoreService::new(
        Arc::new(UnavailableStore),
        Arc::new(UnavailableStore),
    ));

    let response = score_handler::<UnavailableStore, UnavailableStore>(
        State(service),
        Path("buyer-1".to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
