use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for buyer accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuyerId(pub String);

/// Identifier wrapper for seller accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SellerId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DisputeId(pub String);

/// Discrete risk classification derived from the overall score.
///
/// Higher score means lower risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_overall(score: u8) -> Self {
        if score >= 70 {
            RiskLevel::Low
        } else if score >= 40 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

/// Names the weakest component when it falls below the concern threshold.
///
/// `key` is the stable machine-readable identifier; `label` is display copy.
/// Keep them separate so UI wording can change without breaking consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    HighPaymentRisk,
    HighDisputeHistory,
    BehavioralConcerns,
    ComplianceIssues,
}

impl RiskCategory {
    pub const fn key(self) -> &'static str {
        match self {
            RiskCategory::HighPaymentRisk => "HIGH_PAYMENT_RISK",
            RiskCategory::HighDisputeHistory => "HIGH_DISPUTE_HISTORY",
            RiskCategory::BehavioralConcerns => "BEHAVIORAL_CONCERNS",
            RiskCategory::ComplianceIssues => "COMPLIANCE_ISSUES",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            RiskCategory::HighPaymentRisk => "Elevated payment risk",
            RiskCategory::HighDisputeHistory => "Heavy dispute history",
            RiskCategory::BehavioralConcerns => "Behavioral concerns",
            RiskCategory::ComplianceIssues => "Compliance issues",
        }
    }
}

/// The five sub-scores carried on every trust score snapshot.
///
/// Communication is a fixed baseline today; it is stored so the snapshot
/// shape does not change when a real communication scorer lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub payment: u8,
    pub dispute: u8,
    pub behavioral: u8,
    pub compliance: u8,
    pub communication: u8,
}

impl ComponentScores {
    pub const NEUTRAL: u8 = 50;

    pub fn neutral() -> Self {
        Self {
            payment: Self::NEUTRAL,
            dispute: Self::NEUTRAL,
            behavioral: Self::NEUTRAL,
            compliance: Self::NEUTRAL,
            communication: Self::NEUTRAL,
        }
    }
}

/// Cumulative activity counters snapshotted alongside the score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCounters {
    pub total_transactions: u64,
    pub total_disputes: u64,
    pub chargeback_count: u64,
    pub late_payment_count: u64,
}

/// Live trust score row; exactly one per buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerTrustScore {
    pub buyer_id: BuyerId,
    pub components: ComponentScores,
    pub overall_score: u8,
    pub risk_level: RiskLevel,
    pub risk_category: Option<RiskCategory>,
    pub counters: ActivityCounters,
    pub score_version: u64,
    pub last_flag_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl BuyerTrustScore {
    /// Neutral prior for a buyer with no scoring history: every sub-score
    /// starts at 50 so the lack of history is never itself a penalty.
    pub fn neutral(buyer_id: BuyerId, now: DateTime<Utc>) -> Self {
        let components = ComponentScores::neutral();
        Self {
            buyer_id,
            components,
            overall_score: ComponentScores::NEUTRAL,
            risk_level: RiskLevel::from_overall(ComponentScores::NEUTRAL),
            risk_category: None,
            counters: ActivityCounters::default(),
            score_version: 0,
            last_flag_at: None,
            updated_at: now,
        }
    }

    pub fn view(&self) -> TrustScoreView {
        TrustScoreView {
            buyer_id: self.buyer_id.clone(),
            overall_score: self.overall_score,
            risk_level: self.risk_level.label(),
            risk_category: self.risk_category.map(RiskCategory::key),
            components: self.components,
            score_version: self.score_version,
            updated_at: self.updated_at,
        }
    }
}

/// Serializable projection of a trust score for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct TrustScoreView {
    pub buyer_id: BuyerId,
    pub overall_score: u8,
    pub risk_level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_category: Option<&'static str>,
    pub components: ComponentScores,
    pub score_version: u64,
    pub updated_at: DateTime<Utc>,
}

/// Why a score transition was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreChangeReason {
    Recalculation,
}

impl ScoreChangeReason {
    pub const fn label(self) -> &'static str {
        match self {
            ScoreChangeReason::Recalculation => "RECALCULATION",
        }
    }
}

/// Append-only ledger entry written whenever the overall score changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreHistoryEntry {
    pub buyer_id: BuyerId,
    pub previous_score: u8,
    pub new_score: u8,
    pub delta: i16,
    pub reason: ScoreChangeReason,
    pub components: ComponentScores,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagType {
    PaymentDelay,
    Chargeback,
    FraudSuspicion,
    HighDisputeRate,
    PolicyViolation,
}

impl FlagType {
    pub const fn key(self) -> &'static str {
        match self {
            FlagType::PaymentDelay => "PAYMENT_DELAY",
            FlagType::Chargeback => "CHARGEBACK",
            FlagType::FraudSuspicion => "FRAUD_SUSPICION",
            FlagType::HighDisputeRate => "HIGH_DISPUTE_RATE",
            FlagType::PolicyViolation => "POLICY_VIOLATION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FlagSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FlagSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            FlagSeverity::Low => "LOW",
            FlagSeverity::Medium => "MEDIUM",
            FlagSeverity::High => "HIGH",
            FlagSeverity::Critical => "CRITICAL",
        }
    }

    /// High and critical findings page the admin team.
    pub const fn escalates_to_admin(self) -> bool {
        matches!(self, FlagSeverity::High | FlagSeverity::Critical)
    }
}

/// Flags survive appeals; they are resolved or dismissed, never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagStatus {
    Active,
    UnderAppeal,
    Resolved,
    Dismissed,
}

/// Optional linkage and payload for a risk flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlagContext {
    pub transaction_id: Option<TransactionId>,
    pub dispute_id: Option<DisputeId>,
    pub related_data: Option<serde_json::Value>,
}

/// A recorded risk event tied to a buyer's trust score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFlag {
    pub flag_id: String,
    pub buyer_id: BuyerId,
    pub flag_type: FlagType,
    pub severity: FlagSeverity,
    pub status: FlagStatus,
    pub description: String,
    pub context: FlagContext,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    NewFlag,
    ScoreDrop,
}

impl AlertKind {
    pub const fn label(self) -> &'static str {
        match self {
            AlertKind::NewFlag => "NEW_FLAG",
            AlertKind::ScoreDrop => "SCORE_DROP",
        }
    }
}

/// Queued notification row describing a scoring event.
///
/// Delivery is an external collaborator; this layer only records the alert
/// and the seller audience derived from transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerAlert {
    pub buyer_id: BuyerId,
    pub kind: AlertKind,
    pub severity: FlagSeverity,
    pub title: String,
    pub message: String,
    pub seller_audience: Vec<SellerId>,
    pub admin_notified: bool,
    pub created_at: DateTime<Utc>,
}

/// Whether a completed transaction settled on time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentTiming {
    OnTime,
    Late,
    Outstanding,
}

/// Return outcome attached to a transaction, if the buyer returned goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnOutcome {
    None,
    Reasonable,
    Unreasonable,
}

/// Transaction read model consumed by the metric aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: TransactionId,
    pub seller_id: SellerId,
    pub amount: f64,
    pub payment: PaymentTiming,
    pub return_outcome: ReturnOutcome,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeStanding {
    Open,
    ResolvedSellerFavor,
    ResolvedBuyerFavor,
}

/// Dispute read model consumed by the metric aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeRecord {
    pub dispute_id: DisputeId,
    pub standing: DisputeStanding,
    pub chargeback: bool,
    pub opened_at: DateTime<Utc>,
}

/// Seller review read model; only the signals scoring cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub positive: bool,
    pub communication_issue: bool,
}

/// Compliance posture of the buyer as known to the KYB side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceSnapshot {
    pub kyb_verified: bool,
    pub kyb_issue_count: u64,
    pub missing_documentation_count: u64,
    pub sanctions_flag_count: u64,
}

/// Inbound risk events evaluated by the automatic flagging policy.
///
/// Overdue determination is the caller's responsibility: `days_overdue`
/// arrives precomputed, this core never measures elapsed time itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuyerEvent {
    PaymentOverdue {
        transaction_id: TransactionId,
        days_overdue: u32,
    },
    Chargeback {
        transaction_id: TransactionId,
    },
    DisputeCreated {
        dispute_id: DisputeId,
    },
}
