use super::domain::{
    BuyerAlert, BuyerId, BuyerTrustScore, ComplianceSnapshot, DisputeRecord, ReviewRecord,
    RiskFlag, ScoreHistoryEntry, TransactionRecord,
};

/// Error enumeration for trust store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("score version conflict")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("trust store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for the trust score snapshot and its ledgers.
///
/// `persist_score` is an optimistic upsert: `expected_version: None` creates
/// the row and fails with `Conflict` if one already exists; `Some(v)` updates
/// only when the stored version is still `v`. History, flags, and alerts are
/// append-only.
pub trait TrustScoreRepository: Send + Sync {
    fn score(&self, buyer_id: &BuyerId) -> Result<Option<BuyerTrustScore>, RepositoryError>;
    fn persist_score(
        &self,
        score: BuyerTrustScore,
        expected_version: Option<u64>,
    ) -> Result<(), RepositoryError>;
    fn append_history(&self, entry: ScoreHistoryEntry) -> Result<(), RepositoryError>;
    fn history(&self, buyer_id: &BuyerId) -> Result<Vec<ScoreHistoryEntry>, RepositoryError>;
    fn append_flag(&self, flag: RiskFlag) -> Result<RiskFlag, RepositoryError>;
    fn flags(&self, buyer_id: &BuyerId) -> Result<Vec<RiskFlag>, RepositoryError>;
    fn append_alert(&self, alert: BuyerAlert) -> Result<(), RepositoryError>;
    fn alerts(&self, buyer_id: &BuyerId) -> Result<Vec<BuyerAlert>, RepositoryError>;
}

/// Read access to the transactional records the metric aggregator reduces.
///
/// Pure reads; the trust engine never writes through this trait.
pub trait BuyerActivitySource: Send + Sync {
    fn transactions(&self, buyer_id: &BuyerId) -> Result<Vec<TransactionRecord>, RepositoryError>;
    fn disputes(&self, buyer_id: &BuyerId) -> Result<Vec<DisputeRecord>, RepositoryError>;
    fn reviews(&self, buyer_id: &BuyerId) -> Result<Vec<ReviewRecord>, RepositoryError>;
    fn compliance_snapshot(&self, buyer_id: &BuyerId)
        -> Result<ComplianceSnapshot, RepositoryError>;
}
