use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::checks::{self, ArtifactInventory, CheckRunSummary, ComplianceCheckProvider};
use super::country::CountryComplianceCatalog;
use super::domain::{
    Badge, BadgeKind, CheckCategory, CheckState, KybStatus, KybSubmission, ManualDecision,
    RiskAssessment, RiskRating, SupplierId, SupplierKyb, UserKybStatus, VerificationEvent,
    VerificationLogEntry,
};
use super::repository::{
    AdminNotice, AdminNoticeKind, KybRepository, NotificationError, NotificationSink,
    RepositoryError,
};
use super::submission::{BankDetailCipher, KybSubmissionError, SubmissionGuard};

/// Error raised by the KYB service.
#[derive(Debug, thiserror::Error)]
pub enum KybServiceError {
    #[error(transparent)]
    Submission(#[from] KybSubmissionError),
    #[error("supplier {0} is already verified; resubmission is not allowed")]
    AlreadyVerified(String),
    #[error("no KYB record for supplier {0}")]
    NotFound(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

/// Service driving a supplier submission through the verification states.
pub struct KybService<R, N, P, C> {
    repository: Arc<R>,
    notifications: Arc<N>,
    provider: Arc<P>,
    guard: SubmissionGuard<C>,
    catalog: CountryComplianceCatalog,
}

impl<R, N, P, C> KybService<R, N, P, C>
where
    R: KybRepository + 'static,
    N: NotificationSink + 'static,
    P: ComplianceCheckProvider + 'static,
    C: BankDetailCipher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        notifications: Arc<N>,
        provider: Arc<P>,
        cipher: Arc<C>,
    ) -> Self {
        Self {
            repository,
            notifications,
            provider,
            guard: SubmissionGuard::new(cipher),
            catalog: CountryComplianceCatalog::default(),
        }
    }

    /// Fetch the current KYB record for API responses.
    pub fn get(&self, supplier_id: &SupplierId) -> Result<SupplierKyb, KybServiceError> {
        self.repository
            .fetch(supplier_id)?
            .ok_or_else(|| KybServiceError::NotFound(supplier_id.0.clone()))
    }

    /// Create or resubmit a KYB record.
    ///
    /// Validates the required field groups, encrypts bank details, re-enters
    /// `PENDING`, seeds compliance items on the first-ever submission only,
    /// logs `SUBMITTED` or `RESUBMITTED`, mirrors the user's denormalized
    /// status, and broadcasts to the admin topic. A record that reached
    /// `VERIFIED` cannot be resubmitted.
    pub fn submit(&self, submission: KybSubmission) -> Result<SupplierKyb, KybServiceError> {
        let validated = self.guard.validate(&submission)?;
        let supplier_id = submission.supplier_id.clone();
        let now = Utc::now();

        let (mut record, resubmission) = match self.repository.fetch(&supplier_id)? {
            Some(existing) if existing.status == KybStatus::Verified => {
                return Err(KybServiceError::AlreadyVerified(supplier_id.0));
            }
            Some(existing) => (existing, true),
            None => (
                SupplierKyb {
                    supplier_id: supplier_id.clone(),
                    business_name: String::new(),
                    registration_number: String::new(),
                    tax_id: String::new(),
                    registration_country: String::new(),
                    address: validated.address.clone(),
                    contact: validated.contact.clone(),
                    bank: None,
                    status: KybStatus::Pending,
                    checks: Default::default(),
                    rejection_reason: None,
                    rejected_at: None,
                    submission_count: 0,
                    submitted_at: now,
                    updated_at: now,
                },
                false,
            ),
        };

        record.business_name = validated.business_name;
        record.registration_number = validated.registration_number;
        record.tax_id = validated.tax_id;
        record.registration_country = validated.registration_country;
        record.address = validated.address;
        record.contact = validated.contact;
        record.bank = validated.bank;
        record.status = KybStatus::Pending;
        // Resubmission supersedes the prior run: stale check results and the
        // rejection outcome are cleared together.
        record.checks.clear();
        record.rejection_reason = None;
        record.rejected_at = None;
        record.submission_count += 1;
        record.submitted_at = now;
        record.updated_at = now;

        self.repository.upsert(record.clone())?;

        if self.repository.compliance_items(&supplier_id)?.is_empty() {
            let items = self
                .catalog
                .seed_items(&supplier_id, &record.registration_country);
            self.repository.seed_compliance_items(items)?;
        }

        let event = if resubmission {
            VerificationEvent::Resubmitted
        } else {
            VerificationEvent::Submitted
        };
        self.repository.append_log(VerificationLogEntry {
            supplier_id: supplier_id.clone(),
            event,
            detail: format!("submission #{}", record.submission_count),
            recorded_at: now,
        })?;

        self.repository
            .set_user_kyb_status(&supplier_id, UserKybStatus::Submitted)?;

        let kind = if resubmission {
            AdminNoticeKind::KybResubmitted
        } else {
            AdminNoticeKind::KybSubmitted
        };
        self.notifications.notify_admins(AdminNotice {
            kind,
            title: format!("KYB submission from {}", record.business_name),
            message: format!(
                "Supplier {} submitted KYB details for {}",
                supplier_id.0, record.registration_country
            ),
            resource_type: "supplier_kyb",
            resource_id: supplier_id.0.clone(),
        })?;

        info!(supplier = %supplier_id.0, resubmission, "kyb submission accepted");
        Ok(record)
    }

    /// Run the automated check stage.
    ///
    /// All seven categories are initialized pending and every runnable one
    /// runs now, each independently. Document AI waits until all mandatory
    /// compliance items carry documents, bank verification until bank
    /// details exist; calling this again after attaching those artifacts
    /// picks the deferred categories up. Failures mark only their own
    /// category, and a retry skips what already passed. Ends in
    /// `AUTOMATED_CHECKS_COMPLETE`, a refreshed risk assessment, and an
    /// admin notice that manual review is required.
    pub fn run_automated_checks(
        &self,
        supplier_id: &SupplierId,
    ) -> Result<CheckRunSummary, KybServiceError> {
        let mut record = self.get(supplier_id)?;
        if record.status == KybStatus::Verified {
            return Err(KybServiceError::AlreadyVerified(supplier_id.0.clone()));
        }

        let now = Utc::now();
        checks::initialize(&mut record);
        record.status = KybStatus::AutomatedChecksInProgress;
        record.updated_at = now;
        self.repository.upsert(record.clone())?;
        self.repository.append_log(VerificationLogEntry {
            supplier_id: supplier_id.clone(),
            event: VerificationEvent::ChecksStarted,
            detail: "automated checks started".to_string(),
            recorded_at: now,
        })?;

        let items = self.repository.compliance_items(supplier_id)?;
        let artifacts = ArtifactInventory {
            documents_ready: !items.is_empty()
                && items
                    .iter()
                    .filter(|item| item.mandatory)
                    .all(|item| item.document_key.is_some()),
            bank_ready: record.bank.is_some(),
        };
        let summary = checks::run_pending(&mut record, self.provider.as_ref(), artifacts, now);

        record.status = KybStatus::AutomatedChecksComplete;
        record.updated_at = Utc::now();
        self.repository.upsert(record.clone())?;
        self.repository
            .upsert_risk_assessment(Self::assess(&record))?;

        for category in &summary.passed {
            self.repository.append_log(VerificationLogEntry {
                supplier_id: supplier_id.clone(),
                event: VerificationEvent::CheckPassed,
                detail: category.label().to_string(),
                recorded_at: record.updated_at,
            })?;
        }
        for category in &summary.failed {
            self.repository.append_log(VerificationLogEntry {
                supplier_id: supplier_id.clone(),
                event: VerificationEvent::CheckFailed,
                detail: category.label().to_string(),
                recorded_at: record.updated_at,
            })?;
        }
        self.repository.append_log(VerificationLogEntry {
            supplier_id: supplier_id.clone(),
            event: VerificationEvent::ChecksCompleted,
            detail: format!(
                "{} passed, {} failed, {} awaiting artifacts",
                summary.passed.len(),
                summary.failed.len(),
                summary.deferred.len()
            ),
            recorded_at: record.updated_at,
        })?;

        self.notifications.notify_admins(AdminNotice {
            kind: AdminNoticeKind::ManualReviewRequired,
            title: format!("Manual review required for {}", record.business_name),
            message: format!(
                "Automated checks finished for supplier {}",
                supplier_id.0
            ),
            resource_type: "supplier_kyb",
            resource_id: supplier_id.0.clone(),
        })?;

        debug!(
            supplier = %supplier_id.0,
            passed = summary.passed.len(),
            failed = summary.failed.len(),
            "automated checks completed"
        );
        Ok(summary)
    }

    /// Distill the one-per-supplier risk assessment from the check states.
    ///
    /// A sanctions failure rates the supplier high outright; any other
    /// failure rates medium; a clean board rates low.
    fn assess(record: &SupplierKyb) -> RiskAssessment {
        let failed_categories: Vec<CheckCategory> = record
            .checks
            .iter()
            .filter(|(_, check)| check.state == CheckState::Failed)
            .map(|(category, _)| *category)
            .collect();
        let checks_passed = record
            .checks
            .values()
            .filter(|check| check.state == CheckState::Passed)
            .count() as u32;
        let rating = if failed_categories.contains(&CheckCategory::Sanctions) {
            RiskRating::High
        } else if failed_categories.is_empty() {
            RiskRating::Low
        } else {
            RiskRating::Medium
        };
        RiskAssessment {
            supplier_id: record.supplier_id.clone(),
            rating,
            checks_passed,
            checks_failed: failed_categories.len() as u32,
            failed_categories,
            assessed_at: record.updated_at,
        }
    }

    /// Apply the admin's manual review outcome.
    ///
    /// Verification grants the supplier badge. `VERIFIED` is terminal: it
    /// can only be superseded by an explicit resubmission, never by a later
    /// rejection.
    pub fn decide(
        &self,
        supplier_id: &SupplierId,
        decision: ManualDecision,
    ) -> Result<SupplierKyb, KybServiceError> {
        let mut record = self.get(supplier_id)?;
        let now = Utc::now();

        match decision {
            ManualDecision::Verify => {
                record.status = KybStatus::Verified;
                record.rejection_reason = None;
                record.rejected_at = None;
                record.updated_at = now;
                self.repository.upsert(record.clone())?;
                self.repository
                    .set_user_kyb_status(supplier_id, UserKybStatus::Verified)?;
                self.repository.grant_badge(Badge {
                    supplier_id: supplier_id.clone(),
                    kind: BadgeKind::VerifiedSupplier,
                    granted_at: now,
                })?;
                self.repository.append_log(VerificationLogEntry {
                    supplier_id: supplier_id.clone(),
                    event: VerificationEvent::Verified,
                    detail: "manual review approved".to_string(),
                    recorded_at: now,
                })?;
            }
            ManualDecision::Reject { reason } => {
                if record.status == KybStatus::Verified {
                    return Err(KybServiceError::AlreadyVerified(supplier_id.0.clone()));
                }
                record.status = KybStatus::Rejected;
                record.rejection_reason = Some(reason.clone());
                record.rejected_at = Some(now);
                record.updated_at = now;
                self.repository.upsert(record.clone())?;
                self.repository
                    .set_user_kyb_status(supplier_id, UserKybStatus::Rejected)?;
                self.repository.append_log(VerificationLogEntry {
                    supplier_id: supplier_id.clone(),
                    event: VerificationEvent::Rejected,
                    detail: reason,
                    recorded_at: now,
                })?;
            }
        }

        Ok(record)
    }

    /// Attach an uploaded document to one of the seeded compliance items.
    pub fn attach_document(
        &self,
        supplier_id: &SupplierId,
        item_type: &str,
        storage_key: String,
    ) -> Result<(), KybServiceError> {
        self.repository
            .attach_document(supplier_id, item_type, storage_key)?;
        Ok(())
    }
}
