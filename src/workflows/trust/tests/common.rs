use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::{Duration, Utc};
use serde_json::Value;

use crate::workflows::trust::domain::{
    BuyerAlert, BuyerId, BuyerTrustScore, ComplianceSnapshot, DisputeId, DisputeRecord,
    DisputeStanding, PaymentTiming, ReturnOutcome, ReviewRecord, RiskFlag, ScoreHistoryEntry,
    SellerId, TransactionId, TransactionRecord,
};
use crate::workflows::trust::memory::InMemoryTrustStore;
use crate::workflows::trust::repository::{
    BuyerActivitySource, RepositoryError, TrustScoreRepository,
};
use crate::workflows::trust::TrustScoreService;

pub(super) fn buyer(id: &str) -> BuyerId {
    BuyerId(id.to_string())
}

pub(super) fn build_service() -> (
    Arc<TrustScoreService<InMemoryTrustStore, InMemoryTrustStore>>,
    Arc<InMemoryTrustStore>,
) {
    let store = Arc::new(InMemoryTrustStore::default());
    let service = Arc::new(TrustScoreService::new(store.clone(), store.clone()));
    (service, store)
}

pub(super) fn transaction(
    id: &str,
    seller: &str,
    amount: f64,
    payment: PaymentTiming,
    return_outcome: ReturnOutcome,
) -> TransactionRecord {
    TransactionRecord {
        transaction_id: TransactionId(id.to_string()),
        seller_id: SellerId(seller.to_string()),
        amount,
        payment,
        return_outcome,
        completed_at: Utc::now(),
    }
}

pub(super) fn on_time_transaction(id: &str, amount: f64) -> TransactionRecord {
    transaction(
        id,
        "seller-1",
        amount,
        PaymentTiming::OnTime,
        ReturnOutcome::None,
    )
}

pub(super) fn dispute(id: &str, standing: DisputeStanding, chargeback: bool) -> DisputeRecord {
    DisputeRecord {
        dispute_id: DisputeId(id.to_string()),
        standing,
        chargeback,
        opened_at: Utc::now(),
    }
}

pub(super) fn aged_dispute(id: &str, days_ago: i64) -> DisputeRecord {
    DisputeRecord {
        dispute_id: DisputeId(id.to_string()),
        standing: DisputeStanding::ResolvedBuyerFavor,
        chargeback: false,
        opened_at: Utc::now() - Duration::days(days_ago),
    }
}

pub(super) fn review(positive: bool, communication_issue: bool) -> ReviewRecord {
    ReviewRecord {
        positive,
        communication_issue,
    }
}

/// Store that delegates to an in-memory inner but loses a configurable number
/// of optimistic writes before letting one through.
#[derive(Default)]
pub(super) struct ContestedStore {
    pub inner: InMemoryTrustStore,
    pub conflicts_remaining: AtomicUsize,
}

impl ContestedStore {
    pub fn conflicting(times: usize) -> Self {
        let store = Self::default();
        store.conflicts_remaining.store(times, Ordering::Relaxed);
        store
    }
}

impl TrustScoreRepository for ContestedStore {
    fn score(&self, buyer_id: &BuyerId) -> Result<Option<BuyerTrustScore>, RepositoryError> {
        self.inner.score(buyer_id)
    }

    fn persist_score(
        &self,
        score: BuyerTrustScore,
        expected_version: Option<u64>,
    ) -> Result<(), RepositoryError> {
        let remaining = self.conflicts_remaining.load(Ordering::Relaxed);
        if remaining > 0 {
            self.conflicts_remaining
                .store(remaining - 1, Ordering::Relaxed);
            return Err(RepositoryError::Conflict);
        }
        self.inner.persist_score(score, expected_version)
    }

    fn append_history(&self, entry: ScoreHistoryEntry) -> Result<(), RepositoryError> {
        self.inner.append_history(entry)
    }

    fn history(&self, buyer_id: &BuyerId) -> Result<Vec<ScoreHistoryEntry>, RepositoryError> {
        self.inner.history(buyer_id)
    }

    fn append_flag(&self, flag: RiskFlag) -> Result<RiskFlag, RepositoryError> {
        self.inner.append_flag(flag)
    }

    fn flags(&self, buyer_id: &BuyerId) -> Result<Vec<RiskFlag>, RepositoryError> {
        self.inner.flags(buyer_id)
    }

    fn append_alert(&self, alert: BuyerAlert) -> Result<(), RepositoryError> {
        self.inner.append_alert(alert)
    }

    fn alerts(&self, buyer_id: &BuyerId) -> Result<Vec<BuyerAlert>, RepositoryError> {
        self.inner.alerts(buyer_id)
    }
}

pub(super) struct UnavailableStore;

impl TrustScoreRepository for UnavailableStore {
    fn score(&self, _buyer_id: &BuyerId) -> Result<Option<BuyerTrustScore>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn persist_score(
        &self,
        _score: BuyerTrustScore,
        _expected_version: Option<u64>,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn append_history(&self, _entry: ScoreHistoryEntry) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn history(&self, _buyer_id: &BuyerId) -> Result<Vec<ScoreHistoryEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn append_flag(&self, _flag: RiskFlag) -> Result<RiskFlag, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn flags(&self, _buyer_id: &BuyerId) -> Result<Vec<RiskFlag>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn append_alert(&self, _alert: BuyerAlert) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn alerts(&self, _buyer_id: &BuyerId) -> Result<Vec<BuyerAlert>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

impl BuyerActivitySource for UnavailableStore {
    fn transactions(
        &self,
        _buyer_id: &BuyerId,
    ) -> Result<Vec<TransactionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn disputes(&self, _buyer_id: &BuyerId) -> Result<Vec<DisputeRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn reviews(&self, _buyer_id: &BuyerId) -> Result<Vec<ReviewRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn compliance_snapshot(
        &self,
        _buyer_id: &BuyerId,
    ) -> Result<ComplianceSnapshot, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

/// Seed the activity records that saturate the payment and behavioral
/// bonuses: all on-time, $1M volume, every review positive, KYB verified.
pub(super) fn seed_model_buyer(store: &InMemoryTrustStore, buyer_id: &BuyerId) {
    for index in 0..10 {
        store.record_transaction(
            buyer_id,
            on_time_transaction(&format!("tx-{index}"), 100_000.0),
        );
    }
    for _ in 0..5 {
        store.record_review(buyer_id, review(true, false));
    }
    store.set_compliance_snapshot(
        buyer_id,
        ComplianceSnapshot {
            kyb_verified: true,
            ..ComplianceSnapshot::default()
        },
    );
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
