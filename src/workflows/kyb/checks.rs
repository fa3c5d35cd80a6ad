use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use super::domain::{CheckCategory, CheckRecord, CheckState, SupplierKyb};

/// Failure of a single check category. Failures are recorded against the
/// category and never block sibling categories.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CheckFailure(pub String);

/// Boundary to the external compliance screening services.
///
/// One call per category so each category keeps its own latency and failure
/// mode; the runner treats every call independently.
pub trait ComplianceCheckProvider: Send + Sync {
    fn run(
        &self,
        record: &SupplierKyb,
        category: CheckCategory,
    ) -> Result<serde_json::Value, CheckFailure>;
}

/// Outcome of one automated-checks pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckRunSummary {
    pub passed: Vec<CheckCategory>,
    pub failed: Vec<CheckCategory>,
    pub deferred: Vec<CheckCategory>,
}

/// What the artifact-dependent categories have to work with on this pass.
///
/// Document AI needs every mandatory compliance item to carry an uploaded
/// document; bank verification needs bank details on the record.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ArtifactInventory {
    pub documents_ready: bool,
    pub bank_ready: bool,
}

impl ArtifactInventory {
    fn satisfies(self, category: CheckCategory) -> bool {
        match category {
            CheckCategory::DocumentAi => self.documents_ready,
            CheckCategory::BankVerification => self.bank_ready,
            _ => true,
        }
    }
}

/// Ensure every category has a check record, without disturbing results
/// from earlier passes.
pub(crate) fn initialize(record: &mut SupplierKyb) {
    for category in CheckCategory::ALL {
        record
            .checks
            .entry(category)
            .or_insert_with(CheckRecord::pending);
    }
}

/// Run every category that is still runnable.
///
/// Already-passed categories are skipped, so a retry never reruns what
/// succeeded. Artifact-dependent categories (document AI, bank
/// verification) are deferred until their prerequisites exist and run on
/// the first pass after they do. A provider failure marks only that
/// category failed and the loop continues.
pub(crate) fn run_pending<P: ComplianceCheckProvider>(
    record: &mut SupplierKyb,
    provider: &P,
    artifacts: ArtifactInventory,
    now: DateTime<Utc>,
) -> CheckRunSummary {
    let mut summary = CheckRunSummary::default();

    for category in CheckCategory::ALL {
        let state = record
            .checks
            .get(&category)
            .map(|check| check.state)
            .unwrap_or(CheckState::Pending);

        if state == CheckState::Passed {
            continue;
        }
        if !artifacts.satisfies(category) {
            summary.deferred.push(category);
            continue;
        }

        match provider.run(record, category) {
            Ok(result) => {
                record.checks.insert(
                    category,
                    CheckRecord {
                        state: CheckState::Passed,
                        result: Some(result),
                        failure: None,
                        completed_at: Some(now),
                    },
                );
                summary.passed.push(category);
            }
            Err(failure) => {
                record.checks.insert(
                    category,
                    CheckRecord {
                        state: CheckState::Failed,
                        result: None,
                        failure: Some(failure.to_string()),
                        completed_at: Some(now),
                    },
                );
                summary.failed.push(category);
            }
        }
    }

    summary
}

/// Deterministic screening provider for the demo server and tests.
///
/// Real deployments call out to sanctions/PEP/credit vendors; this one
/// screens against a small embedded denylist and passes everything else.
#[derive(Debug, Clone)]
pub struct OfflineCheckProvider {
    denylist: Vec<String>,
}

impl OfflineCheckProvider {
    pub fn with_denylist(denylist: Vec<String>) -> Self {
        Self {
            denylist: denylist
                .into_iter()
                .map(|name| name.to_ascii_lowercase())
                .collect(),
        }
    }

    fn denylisted(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.denylist.iter().any(|entry| name.contains(entry))
    }
}

impl Default for OfflineCheckProvider {
    fn default() -> Self {
        Self::with_denylist(vec![
            "global sanctions test co".to_string(),
            "embargoed trading".to_string(),
        ])
    }
}

impl ComplianceCheckProvider for OfflineCheckProvider {
    fn run(
        &self,
        record: &SupplierKyb,
        category: CheckCategory,
    ) -> Result<serde_json::Value, CheckFailure> {
        match category {
            CheckCategory::Sanctions => {
                if self.denylisted(&record.business_name) {
                    Err(CheckFailure(
                        "business name matched the sanctions denylist".to_string(),
                    ))
                } else {
                    Ok(json!({ "matches": 0 }))
                }
            }
            CheckCategory::Pep => Ok(json!({ "matches": 0 })),
            CheckCategory::AdverseMedia => Ok(json!({ "articles_reviewed": 0, "hits": 0 })),
            CheckCategory::Credit => Ok(json!({ "band": "B", "source": "offline" })),
            CheckCategory::Registry => Ok(json!({
                "registry_match": true,
                "registration_number": record.registration_number,
            })),
            // Only reached once the runner has confirmed the artifacts exist.
            CheckCategory::DocumentAi => Ok(json!({
                "documents_legible": true,
                "extraction_confidence": 0.93,
            })),
            CheckCategory::BankVerification => Ok(json!({
                "account_name_match": true,
                "bank_name": record.bank.as_ref().map(|bank| bank.bank_name.clone()),
            })),
        }
    }
}
