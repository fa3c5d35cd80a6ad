use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::kyb::checks::OfflineCheckProvider;
use crate::workflows::kyb::domain::{KybSubmission, SupplierId};
use crate::workflows::kyb::memory::{InMemoryKybStore, RecordingNotificationSink};
use crate::workflows::kyb::service::KybService;
use crate::workflows::kyb::submission::XorObfuscationCipher;

pub(super) type MemoryKybService =
    KybService<InMemoryKybStore, RecordingNotificationSink, OfflineCheckProvider, XorObfuscationCipher>;

pub(super) fn supplier(id: &str) -> SupplierId {
    SupplierId(id.to_string())
}

pub(super) fn build_service() -> (
    Arc<MemoryKybService>,
    Arc<InMemoryKybStore>,
    Arc<RecordingNotificationSink>,
) {
    build_service_with_provider(OfflineCheckProvider::default())
}

pub(super) fn build_service_with_provider(
    provider: OfflineCheckProvider,
) -> (
    Arc<MemoryKybService>,
    Arc<InMemoryKybStore>,
    Arc<RecordingNotificationSink>,
) {
    let store = Arc::new(InMemoryKybStore::default());
    let sink = Arc::new(RecordingNotificationSink::default());
    let service = Arc::new(KybService::new(
        store.clone(),
        sink.clone(),
        Arc::new(provider),
        Arc::new(XorObfuscationCipher::default()),
    ));
    (service, store, sink)
}

/// Rebuild a service over an existing store, e.g. to swap the screening
/// provider between runs.
pub(super) fn service_over(
    store: Arc<InMemoryKybStore>,
    sink: Arc<RecordingNotificationSink>,
    provider: OfflineCheckProvider,
) -> Arc<MemoryKybService> {
    Arc::new(KybService::new(
        store,
        sink,
        Arc::new(provider),
        Arc::new(XorObfuscationCipher::default()),
    ))
}

pub(super) fn submission(id: &str) -> KybSubmission {
    KybSubmission {
        supplier_id: supplier(id),
        business_name: "Nordwind Components GmbH".to_string(),
        registration_number: "HRB 187233".to_string(),
        tax_id: "DE319428007".to_string(),
        registration_country: " de ".to_string(),
        address_line: "Lagerstrasse 14".to_string(),
        city: "Hamburg".to_string(),
        postal_code: "20097".to_string(),
        contact_name: "Petra Ostermann".to_string(),
        contact_email: "petra@nordwind-components.example".to_string(),
        bank_name: Some("Hanseatische Sparkasse".to_string()),
        bank_account_number: Some("DE89 3704 0044 0532 0130 00".to_string()),
    }
}

pub(super) fn bankless_submission(id: &str) -> KybSubmission {
    let mut submission = submission(id);
    submission.bank_name = None;
    submission.bank_account_number = None;
    submission
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
