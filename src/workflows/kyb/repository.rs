use super::domain::{
    Badge, ComplianceItem, RiskAssessment, SupplierId, SupplierKyb, UserKybStatus,
    VerificationLogEntry,
};

/// Error enumeration for KYB store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("kyb store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for KYB records, compliance items, risk assessments,
/// badges, and the audit log.
///
/// The verification log is append-only. Risk assessments and badges are one
/// row per supplier, replaced in place. `seed_compliance_items` is called at
/// most once per supplier; the service checks for existing items first so
/// resubmissions never duplicate rows.
pub trait KybRepository: Send + Sync {
    fn fetch(&self, supplier_id: &SupplierId) -> Result<Option<SupplierKyb>, RepositoryError>;
    fn upsert(&self, record: SupplierKyb) -> Result<(), RepositoryError>;
    fn compliance_items(
        &self,
        supplier_id: &SupplierId,
    ) -> Result<Vec<ComplianceItem>, RepositoryError>;
    fn seed_compliance_items(&self, items: Vec<ComplianceItem>) -> Result<(), RepositoryError>;
    fn attach_document(
        &self,
        supplier_id: &SupplierId,
        item_type: &str,
        storage_key: String,
    ) -> Result<(), RepositoryError>;
    fn upsert_risk_assessment(&self, assessment: RiskAssessment) -> Result<(), RepositoryError>;
    fn risk_assessment(
        &self,
        supplier_id: &SupplierId,
    ) -> Result<Option<RiskAssessment>, RepositoryError>;
    fn grant_badge(&self, badge: Badge) -> Result<(), RepositoryError>;
    fn badge(&self, supplier_id: &SupplierId) -> Result<Option<Badge>, RepositoryError>;
    fn append_log(&self, entry: VerificationLogEntry) -> Result<(), RepositoryError>;
    fn log(&self, supplier_id: &SupplierId) -> Result<Vec<VerificationLogEntry>, RepositoryError>;
    fn set_user_kyb_status(
        &self,
        supplier_id: &SupplierId,
        status: UserKybStatus,
    ) -> Result<(), RepositoryError>;
}

/// Notice published to the admin notification topic.
///
/// Admin fan-out is a topic publish, not an iteration over the live user
/// table, so admin headcount never affects the submission write path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminNotice {
    pub kind: AdminNoticeKind,
    pub title: String,
    pub message: String,
    pub resource_type: &'static str,
    pub resource_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminNoticeKind {
    KybSubmitted,
    KybResubmitted,
    ManualReviewRequired,
}

impl AdminNoticeKind {
    pub const fn label(self) -> &'static str {
        match self {
            AdminNoticeKind::KybSubmitted => "KYB_SUBMITTED",
            AdminNoticeKind::KybResubmitted => "KYB_RESUBMITTED",
            AdminNoticeKind::ManualReviewRequired => "KYB_MANUAL_REVIEW_REQUIRED",
        }
    }
}

/// Outbound notification boundary; delivery mechanics live elsewhere.
pub trait NotificationSink: Send + Sync {
    fn notify_admins(&self, notice: AdminNotice) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
