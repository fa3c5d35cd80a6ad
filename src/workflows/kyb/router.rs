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
use tracing::warn;

use super::checks::ComplianceCheckProvider;
use super::domain::{KybSubmission, ManualDecision, SupplierId};
use super::repository::{KybRepository, NotificationSink};
use super::service::{KybService, KybServiceError};
use super::submission::BankDetailCipher;

/// Router builder exposing HTTP endpoints for the KYB workflow.
pub fn kyb_router<R, N, P, C>(service: Arc<KybService<R, N, P, C>>) -> Router
where
    R: KybRepository + 'static,
    N: NotificationSink + 'static,
    P: ComplianceCheckProvider + 'static,
    C: BankDetailCipher + 'static,
{
    Router::new()
        .route("/api/v1/suppliers/kyb", post(submit_handler::<R, N, P, C>))
        .route(
            "/api/v1/suppliers/:supplier_id/kyb",
            get(status_handler::<R, N, P, C>),
        )
        .route(
            "/api/v1/suppliers/:supplier_id/kyb/checks",
            post(checks_handler::<R, N, P, C>),
        )
        .route(
            "/api/v1/suppliers/:supplier_id/kyb/decision",
            post(decision_handler::<R, N, P, C>),
        )
        .route(
            "/api/v1/suppliers/:supplier_id/kyb/documents",
            post(document_handler::<R, N, P, C>),
        )
        .with_state(service)
}

pub(crate) async fn submit_handler<R, N, P, C>(
    State(service): State<Arc<KybService<R, N, P, C>>>,
    axum::Json(submission): axum::Json<KybSubmission>,
) -> Response
where
    R: KybRepository + 'static,
    N: NotificationSink + 'static,
    P: ComplianceCheckProvider + 'static,
    C: BankDetailCipher + 'static,
{
    match service.submit(submission) {
        Ok(record) => {
            // Fire-and-forget: the automated stage runs out-of-band so the
            // submission response never waits on external screening calls.
            let supplier_id = record.supplier_id.clone();
            let background = service.clone();
            tokio::task::spawn_blocking(move || {
                if let Err(error) = background.run_automated_checks(&supplier_id) {
                    warn!(supplier = %supplier_id.0, %error, "automated checks failed to run");
                }
            });
            (StatusCode::ACCEPTED, axum::Json(record.view())).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, N, P, C>(
    State(service): State<Arc<KybService<R, N, P, C>>>,
    Path(supplier_id): Path<String>,
) -> Response
where
    R: KybRepository + 'static,
    N: NotificationSink + 'static,
    P: ComplianceCheckProvider + 'static,
    C: BankDetailCipher + 'static,
{
    match service.get(&SupplierId(supplier_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn checks_handler<R, N, P, C>(
    State(service): State<Arc<KybService<R, N, P, C>>>,
    Path(supplier_id): Path<String>,
) -> Response
where
    R: KybRepository + 'static,
    N: NotificationSink + 'static,
    P: ComplianceCheckProvider + 'static,
    C: BankDetailCipher + 'static,
{
    match service.run_automated_checks(&SupplierId(supplier_id)) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decision_handler<R, N, P, C>(
    State(service): State<Arc<KybService<R, N, P, C>>>,
    Path(supplier_id): Path<String>,
    axum::Json(decision): axum::Json<ManualDecision>,
) -> Response
where
    R: KybRepository + 'static,
    N: NotificationSink + 'static,
    P: ComplianceCheckProvider + 'static,
    C: BankDetailCipher + 'static,
{
    match service.decide(&SupplierId(supplier_id), decision) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentRequest {
    pub item_type: String,
    pub storage_key: String,
}

pub(crate) async fn document_handler<R, N, P, C>(
    State(service): State<Arc<KybService<R, N, P, C>>>,
    Path(supplier_id): Path<String>,
    axum::Json(request): axum::Json<DocumentRequest>,
) -> Response
where
    R: KybRepository + 'static,
    N: NotificationSink + 'static,
    P: ComplianceCheckProvider + 'static,
    C: BankDetailCipher + 'static,
{
    match service.attach_document(
        &SupplierId(supplier_id),
        &request.item_type,
        request.storage_key,
    ) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: KybServiceError) -> Response {
    let status = match &error {
        KybServiceError::Submission(submission) if submission.is_validation() => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        KybServiceError::AlreadyVerified(_) => StatusCode::CONFLICT,
        KybServiceError::NotFound(_)
        | KybServiceError::Repository(super::repository::RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
