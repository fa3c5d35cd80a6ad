use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for supplier users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupplierId(pub String);

/// Overall verification state machine.
///
/// `Pending → AutomatedChecksInProgress → AutomatedChecksComplete →
/// Verified | Rejected`. A rejected submission may re-enter `Pending` via
/// resubmission; `Verified` never regresses otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KybStatus {
    Pending,
    AutomatedChecksInProgress,
    AutomatedChecksComplete,
    Verified,
    Rejected,
}

impl KybStatus {
    pub const fn label(self) -> &'static str {
        match self {
            KybStatus::Pending => "PENDING",
            KybStatus::AutomatedChecksInProgress => "AUTOMATED_CHECKS_IN_PROGRESS",
            KybStatus::AutomatedChecksComplete => "AUTOMATED_CHECKS_COMPLETE",
            KybStatus::Verified => "VERIFIED",
            KybStatus::Rejected => "REJECTED",
        }
    }
}

/// Denormalized status mirrored onto the owning user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserKybStatus {
    NotSubmitted,
    Submitted,
    Verified,
    Rejected,
}

impl UserKybStatus {
    pub const fn label(self) -> &'static str {
        match self {
            UserKybStatus::NotSubmitted => "NOT_SUBMITTED",
            UserKybStatus::Submitted => "SUBMITTED",
            UserKybStatus::Verified => "VERIFIED",
            UserKybStatus::Rejected => "REJECTED",
        }
    }
}

/// Inbound submission payload before validation and encryption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KybSubmission {
    pub supplier_id: SupplierId,
    pub business_name: String,
    pub registration_number: String,
    pub tax_id: String,
    pub registration_country: String,
    pub address_line: String,
    pub city: String,
    pub postal_code: String,
    pub contact_name: String,
    pub contact_email: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub bank_account_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessAddress {
    pub line: String,
    pub city: String,
    pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
}

/// Bank details as persisted: account number encrypted, last four retained
/// for masked display. The plaintext never touches storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedBankDetails {
    pub bank_name: String,
    pub encrypted_account_number: String,
    pub last_four: String,
}

impl EncryptedBankDetails {
    /// Display form: everything but the last four digits masked.
    pub fn masked_account_number(&self) -> String {
        format!("****{}", self.last_four)
    }
}

/// The seven automated check categories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CheckCategory {
    Sanctions,
    Pep,
    AdverseMedia,
    Credit,
    Registry,
    DocumentAi,
    BankVerification,
}

impl CheckCategory {
    pub const ALL: [CheckCategory; 7] = [
        CheckCategory::Sanctions,
        CheckCategory::Pep,
        CheckCategory::AdverseMedia,
        CheckCategory::Credit,
        CheckCategory::Registry,
        CheckCategory::DocumentAi,
        CheckCategory::BankVerification,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            CheckCategory::Sanctions => "SANCTIONS",
            CheckCategory::Pep => "PEP",
            CheckCategory::AdverseMedia => "ADVERSE_MEDIA",
            CheckCategory::Credit => "CREDIT",
            CheckCategory::Registry => "REGISTRY",
            CheckCategory::DocumentAi => "DOCUMENT_AI",
            CheckCategory::BankVerification => "BANK_VERIFICATION",
        }
    }

    /// Document AI needs uploaded documents and bank verification needs
    /// micro-deposits; both stay pending until those artifacts exist.
    pub const fn requires_artifact(self) -> bool {
        matches!(self, CheckCategory::DocumentAi | CheckCategory::BankVerification)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckState {
    Pending,
    Passed,
    Failed,
}

/// Per-category check record; each category is independently retryable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub state: CheckState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CheckRecord {
    pub fn pending() -> Self {
        Self {
            state: CheckState::Pending,
            result: None,
            failure: None,
            completed_at: None,
        }
    }
}

/// One KYB record per supplier user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierKyb {
    pub supplier_id: SupplierId,
    pub business_name: String,
    pub registration_number: String,
    pub tax_id: String,
    pub registration_country: String,
    pub address: BusinessAddress,
    pub contact: ContactDetails,
    pub bank: Option<EncryptedBankDetails>,
    pub status: KybStatus,
    pub checks: BTreeMap<CheckCategory, CheckRecord>,
    pub rejection_reason: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub submission_count: u32,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupplierKyb {
    pub fn view(&self) -> KybStatusView {
        KybStatusView {
            supplier_id: self.supplier_id.clone(),
            status: self.status.label(),
            business_name: self.business_name.clone(),
            registration_country: self.registration_country.clone(),
            bank_account_masked: self
                .bank
                .as_ref()
                .map(EncryptedBankDetails::masked_account_number),
            checks: self
                .checks
                .iter()
                .map(|(category, record)| CheckView {
                    category: category.label(),
                    state: record.state,
                    failure: record.failure.clone(),
                    completed_at: record.completed_at,
                })
                .collect(),
            rejection_reason: self.rejection_reason.clone(),
            submission_count: self.submission_count,
        }
    }
}

/// Sanitized projection of a KYB record for API responses; bank details are
/// only ever exposed masked.
#[derive(Debug, Clone, Serialize)]
pub struct KybStatusView {
    pub supplier_id: SupplierId,
    pub status: &'static str,
    pub business_name: String,
    pub registration_country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_masked: Option<String>,
    pub checks: Vec<CheckView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub submission_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckView {
    pub category: &'static str,
    pub state: CheckState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Risk rating distilled from the automated check outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskRating {
    Low,
    Medium,
    High,
}

impl RiskRating {
    pub const fn label(self) -> &'static str {
        match self {
            RiskRating::Low => "LOW",
            RiskRating::Medium => "MEDIUM",
            RiskRating::High => "HIGH",
        }
    }
}

/// Per-supplier risk assessment; exactly one, refreshed by every automated
/// check run so it always reflects the latest check states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub supplier_id: SupplierId,
    pub rating: RiskRating,
    pub checks_passed: u32,
    pub checks_failed: u32,
    pub failed_categories: Vec<CheckCategory>,
    pub assessed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeKind {
    VerifiedSupplier,
}

impl BadgeKind {
    pub const fn label(self) -> &'static str {
        match self {
            BadgeKind::VerifiedSupplier => "VERIFIED_SUPPLIER",
        }
    }
}

/// Marketplace badge; at most one per supplier, granted when manual review
/// approves the KYB record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub supplier_id: SupplierId,
    pub kind: BadgeKind,
    pub granted_at: DateTime<Utc>,
}

/// One compliance requirement instance per KYB record, seeded from country
/// configuration at first submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceItem {
    pub supplier_id: SupplierId,
    pub item_type: String,
    pub display_name: String,
    pub description: String,
    pub mandatory: bool,
    pub document_key: Option<String>,
}

/// Audit trail event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationEvent {
    Submitted,
    Resubmitted,
    ChecksStarted,
    CheckPassed,
    CheckFailed,
    ChecksCompleted,
    Verified,
    Rejected,
}

impl VerificationEvent {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationEvent::Submitted => "SUBMITTED",
            VerificationEvent::Resubmitted => "RESUBMITTED",
            VerificationEvent::ChecksStarted => "AUTOMATED_CHECKS_STARTED",
            VerificationEvent::CheckPassed => "CHECK_PASSED",
            VerificationEvent::CheckFailed => "CHECK_FAILED",
            VerificationEvent::ChecksCompleted => "AUTOMATED_CHECKS_COMPLETED",
            VerificationEvent::Verified => "VERIFIED",
            VerificationEvent::Rejected => "REJECTED",
        }
    }
}

/// Append-only audit entry; never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationLogEntry {
    pub supplier_id: SupplierId,
    pub event: VerificationEvent,
    pub detail: String,
    pub recorded_at: DateTime<Utc>,
}

/// Admin-triggered manual review outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ManualDecision {
    Verify,
    Reject { reason: String },
}
