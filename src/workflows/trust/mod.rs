//! Buyer Trust & Risk Engine.
//!
//! Aggregates transaction, dispute, review, and compliance signals into a
//! 0-100 trust score with a discrete risk level, keeps an append-only score
//! history, and manages risk flags and the alerts they fan out.

pub mod domain;
pub mod memory;
pub mod metrics;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ActivityCounters, AlertKind, BuyerAlert, BuyerEvent, BuyerId, BuyerTrustScore,
    ComplianceSnapshot, ComponentScores, DisputeId, DisputeRecord, DisputeStanding, FlagContext,
    FlagSeverity, FlagStatus, FlagType, PaymentTiming, ReturnOutcome, ReviewRecord, RiskCategory,
    RiskFlag, RiskLevel, ScoreChangeReason, ScoreHistoryEntry, SellerId, TransactionId,
    TransactionRecord, TrustScoreView,
};
pub use memory::InMemoryTrustStore;
pub use metrics::{BuyerMetrics, MetricAggregator};
pub use repository::{BuyerActivitySource, RepositoryError, TrustScoreRepository};
pub use router::trust_router;
pub use scoring::{ScoreEngine, ScoreOutcome, COMMUNICATION_BASELINE};
pub use service::{TrustScoreService, TrustServiceError};
