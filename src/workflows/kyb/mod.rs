//! KYB (Know-Your-Business) verification workflow.
//!
//! Drives a supplier submission through staged automated checks and manual
//! review, with country-seeded compliance items, an append-only audit log,
//! and encrypted-at-rest bank details.

pub mod checks;
pub mod country;
pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;
pub mod submission;

#[cfg(test)]
mod tests;

pub use checks::{CheckFailure, CheckRunSummary, ComplianceCheckProvider, OfflineCheckProvider};
pub use country::{ComplianceRequirement, CountryComplianceCatalog, DEFAULT_REQUIREMENTS};
pub use domain::{
    Badge, BadgeKind, BusinessAddress, CheckCategory, CheckRecord, CheckState, CheckView,
    ComplianceItem, ContactDetails, EncryptedBankDetails, KybStatus, KybStatusView, KybSubmission,
    ManualDecision, RiskAssessment, RiskRating, SupplierId, SupplierKyb, UserKybStatus,
    VerificationEvent, VerificationLogEntry,
};
pub use memory::{InMemoryKybStore, RecordingNotificationSink};
pub use repository::{
    AdminNotice, AdminNoticeKind, KybRepository, NotificationError, NotificationSink,
    RepositoryError,
};
pub use router::kyb_router;
pub use service::{KybService, KybServiceError};
pub use submission::{
    BankDetailCipher, CipherError, KybSubmissionError, SubmissionGuard, XorObfuscationCipher,
};
