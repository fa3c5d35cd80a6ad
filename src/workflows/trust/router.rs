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

use super::domain::{BuyerEvent, BuyerId, FlagContext, FlagSeverity, FlagType};
use super::repository::{BuyerActivitySource, RepositoryError, TrustScoreRepository};
use super::service::{TrustScoreService, TrustServiceError};

/// Router builder exposing HTTP endpoints for the trust engine.
pub fn trust_router<S, R>(service: Arc<TrustScoreService<S, R>>) -> Router
where
    S: BuyerActivitySource + 'static,
    R: TrustScoreRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/buyers/:buyer_id/trust",
            get(score_handler::<S, R>),
        )
        .route(
            "/api/v1/buyers/:buyer_id/trust/recalculate",
            post(recalculate_handler::<S, R>),
        )
        .route(
            "/api/v1/buyers/:buyer_id/trust/flags",
            post(flag_handler::<S, R>),
        )
        .route(
            "/api/v1/buyers/:buyer_id/trust/events",
            post(event_handler::<S, R>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct FlagRequest {
    pub flag_type: FlagType,
    pub severity: FlagSeverity,
    pub description: String,
    #[serde(default)]
    pub context: FlagContext,
}

pub(crate) async fn score_handler<S, R>(
    State(service): State<Arc<TrustScoreService<S, R>>>,
    Path(buyer_id): Path<String>,
) -> Response
where
    S: BuyerActivitySource + 'static,
    R: TrustScoreRepository + 'static,
{
    let id = BuyerId(buyer_id);
    match service.get(&id) {
        Ok(score) => (StatusCode::OK, axum::Json(score.view())).into_response(),
        Err(TrustServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": format!("no trust score for buyer {}", id.0) });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => internal_error(other),
    }
}

pub(crate) async fn recalculate_handler<S, R>(
    State(service): State<Arc<TrustScoreService<S, R>>>,
    Path(buyer_id): Path<String>,
) -> Response
where
    S: BuyerActivitySource + 'static,
    R: TrustScoreRepository + 'static,
{
    let id = BuyerId(buyer_id);
    match service.recalculate(&id) {
        Ok(score) => (StatusCode::OK, axum::Json(score.view())).into_response(),
        Err(error) => internal_error(error),
    }
}

pub(crate) async fn flag_handler<S, R>(
    State(service): State<Arc<TrustScoreService<S, R>>>,
    Path(buyer_id): Path<String>,
    axum::Json(request): axum::Json<FlagRequest>,
) -> Response
where
    S: BuyerActivitySource + 'static,
    R: TrustScoreRepository + 'static,
{
    let id = BuyerId(buyer_id);
    match service.create_risk_flag(
        &id,
        request.flag_type,
        request.severity,
        request.description,
        request.context,
    ) {
        Ok(flag) => (StatusCode::CREATED, axum::Json(flag)).into_response(),
        Err(error) => internal_error(error),
    }
}

pub(crate) async fn event_handler<S, R>(
    State(service): State<Arc<TrustScoreService<S, R>>>,
    Path(buyer_id): Path<String>,
    axum::Json(event): axum::Json<BuyerEvent>,
) -> Response
where
    S: BuyerActivitySource + 'static,
    R: TrustScoreRepository + 'static,
{
    let id = BuyerId(buyer_id);
    match service.handle_event(&id, event) {
        Ok(flags) => {
            let payload = json!({ "flags_created": flags });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
        Err(error) => internal_error(error),
    }
}

fn internal_error(error: TrustServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}
