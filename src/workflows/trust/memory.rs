use std::collections::HashMap;
use std::sync::Mutex;

use super::domain::{
    BuyerAlert, BuyerId, BuyerTrustScore, ComplianceSnapshot, DisputeRecord, ReviewRecord,
    RiskFlag, ScoreHistoryEntry, TransactionRecord,
};
use super::repository::{BuyerActivitySource, RepositoryError, TrustScoreRepository};

/// In-memory trust store backing the bundled server binary and the test
/// suites. Doubles as the activity source so scenarios can seed raw
/// transaction, dispute, and review records directly.
#[derive(Default)]
pub struct InMemoryTrustStore {
    scores: Mutex<HashMap<BuyerId, BuyerTrustScore>>,
    history: Mutex<Vec<ScoreHistoryEntry>>,
    flags: Mutex<Vec<RiskFlag>>,
    alerts: Mutex<Vec<BuyerAlert>>,
    transactions: Mutex<HashMap<BuyerId, Vec<TransactionRecord>>>,
    disputes: Mutex<HashMap<BuyerId, Vec<DisputeRecord>>>,
    reviews: Mutex<HashMap<BuyerId, Vec<ReviewRecord>>>,
    compliance: Mutex<HashMap<BuyerId, ComplianceSnapshot>>,
}

impl InMemoryTrustStore {
    pub fn record_transaction(&self, buyer_id: &BuyerId, record: TransactionRecord) {
        self.transactions
            .lock()
            .expect("transaction mutex poisoned")
            .entry(buyer_id.clone())
            .or_default()
            .push(record);
    }

    pub fn record_dispute(&self, buyer_id: &BuyerId, record: DisputeRecord) {
        self.disputes
            .lock()
            .expect("dispute mutex poisoned")
            .entry(buyer_id.clone())
            .or_default()
            .push(record);
    }

    pub fn record_review(&self, buyer_id: &BuyerId, record: ReviewRecord) {
        self.reviews
            .lock()
            .expect("review mutex poisoned")
            .entry(buyer_id.clone())
            .or_default()
            .push(record);
    }

    pub fn set_compliance_snapshot(&self, buyer_id: &BuyerId, snapshot: ComplianceSnapshot) {
        self.compliance
            .lock()
            .expect("compliance mutex poisoned")
            .insert(buyer_id.clone(), snapshot);
    }
}

impl TrustScoreRepository for InMemoryTrustStore {
    fn score(&self, buyer_id: &BuyerId) -> Result<Option<BuyerTrustScore>, RepositoryError> {
        let guard = self.scores.lock().expect("score mutex poisoned");
        Ok(guard.get(buyer_id).cloned())
    }

    fn persist_score(
        &self,
        score: BuyerTrustScore,
        expected_version: Option<u64>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.scores.lock().expect("score mutex poisoned");
        match (expected_version, guard.get(&score.buyer_id)) {
            (None, Some(_)) => return Err(RepositoryError::Conflict),
            (None, None) => {}
            (Some(_), None) => return Err(RepositoryError::NotFound),
            (Some(expected), Some(current)) => {
                if current.score_version != expected {
                    return Err(RepositoryError::Conflict);
                }
            }
        }
        guard.insert(score.buyer_id.clone(), score);
        Ok(())
    }

    fn append_history(&self, entry: ScoreHistoryEntry) -> Result<(), RepositoryError> {
        self.history
            .lock()
            .expect("history mutex poisoned")
            .push(entry);
        Ok(())
    }

    fn history(&self, buyer_id: &BuyerId) -> Result<Vec<ScoreHistoryEntry>, RepositoryError> {
        let guard = self.history.lock().expect("history mutex poisoned");
        Ok(guard
            .iter()
            .filter(|entry| &entry.buyer_id == buyer_id)
            .cloned()
            .collect())
    }

    fn append_flag(&self, flag: RiskFlag) -> Result<RiskFlag, RepositoryError> {
        self.flags
            .lock()
            .expect("flag mutex poisoned")
            .push(flag.clone());
        Ok(flag)
    }

    fn flags(&self, buyer_id: &BuyerId) -> Result<Vec<RiskFlag>, RepositoryError> {
        let guard = self.flags.lock().expect("flag mutex poisoned");
        Ok(guard
            .iter()
            .filter(|flag| &flag.buyer_id == buyer_id)
            .cloned()
            .collect())
    }

    fn append_alert(&self, alert: BuyerAlert) -> Result<(), RepositoryError> {
        self.alerts
            .lock()
            .expect("alert mutex poisoned")
            .push(alert);
        Ok(())
    }

    fn alerts(&self, buyer_id: &BuyerId) -> Result<Vec<BuyerAlert>, RepositoryError> {
        let guard = self.alerts.lock().expect("alert mutex poisoned");
        Ok(guard
            .iter()
            .filter(|alert| &alert.buyer_id == buyer_id)
            .cloned()
            .collect())
    }
}

impl BuyerActivitySource for InMemoryTrustStore {
    fn transactions(&self, buyer_id: &BuyerId) -> Result<Vec<TransactionRecord>, RepositoryError> {
        let guard = self.transactions.lock().expect("transaction mutex poisoned");
        Ok(guard.get(buyer_id).cloned().unwrap_or_default())
    }

    fn disputes(&self, buyer_id: &BuyerId) -> Result<Vec<DisputeRecord>, RepositoryError> {
        let guard = self.disputes.lock().expect("dispute mutex poisoned");
        Ok(guard.get(buyer_id).cloned().unwrap_or_default())
    }

    fn reviews(&self, buyer_id: &BuyerId) -> Result<Vec<ReviewRecord>, RepositoryError> {
        let guard = self.reviews.lock().expect("review mutex poisoned");
        Ok(guard.get(buyer_id).cloned().unwrap_or_default())
    }

    fn compliance_snapshot(
        &self,
        buyer_id: &BuyerId,
    ) -> Result<ComplianceSnapshot, RepositoryError> {
        let guard = self.compliance.lock().expect("compliance mutex poisoned");
        Ok(guard.get(buyer_id).copied().unwrap_or_default())
    }
}
