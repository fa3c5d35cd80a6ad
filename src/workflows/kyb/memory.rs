use std::collections::HashMap;
use std::sync::Mutex;

use super::domain::{
    Badge, ComplianceItem, RiskAssessment, SupplierId, SupplierKyb, UserKybStatus,
    VerificationLogEntry,
};
use super::repository::{
    AdminNotice, KybRepository, NotificationError, NotificationSink, RepositoryError,
};

/// In-memory KYB store backing the bundled server binary and the tests.
#[derive(Default)]
pub struct InMemoryKybStore {
    records: Mutex<HashMap<SupplierId, SupplierKyb>>,
    items: Mutex<Vec<ComplianceItem>>,
    assessments: Mutex<HashMap<SupplierId, RiskAssessment>>,
    badges: Mutex<HashMap<SupplierId, Badge>>,
    log: Mutex<Vec<VerificationLogEntry>>,
    user_statuses: Mutex<HashMap<SupplierId, UserKybStatus>>,
}

impl InMemoryKybStore {
    pub fn user_kyb_status(&self, supplier_id: &SupplierId) -> Option<UserKybStatus> {
        self.user_statuses
            .lock()
            .expect("user status mutex poisoned")
            .get(supplier_id)
            .copied()
    }
}

impl KybRepository for InMemoryKybStore {
    fn fetch(&self, supplier_id: &SupplierId) -> Result<Option<SupplierKyb>, RepositoryError> {
        let guard = self.records.lock().expect("record mutex poisoned");
        Ok(guard.get(supplier_id).cloned())
    }

    fn upsert(&self, record: SupplierKyb) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("record mutex poisoned");
        guard.insert(record.supplier_id.clone(), record);
        Ok(())
    }

    fn compliance_items(
        &self,
        supplier_id: &SupplierId,
    ) -> Result<Vec<ComplianceItem>, RepositoryError> {
        let guard = self.items.lock().expect("item mutex poisoned");
        Ok(guard
            .iter()
            .filter(|item| &item.supplier_id == supplier_id)
            .cloned()
            .collect())
    }

    fn seed_compliance_items(&self, items: Vec<ComplianceItem>) -> Result<(), RepositoryError> {
        self.items
            .lock()
            .expect("item mutex poisoned")
            .extend(items);
        Ok(())
    }

    fn attach_document(
        &self,
        supplier_id: &SupplierId,
        item_type: &str,
        storage_key: String,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.items.lock().expect("item mutex poisoned");
        let item = guard
            .iter_mut()
            .find(|item| &item.supplier_id == supplier_id && item.item_type == item_type)
            .ok_or(RepositoryError::NotFound)?;
        item.document_key = Some(storage_key);
        Ok(())
    }

    fn upsert_risk_assessment(&self, assessment: RiskAssessment) -> Result<(), RepositoryError> {
        self.assessments
            .lock()
            .expect("assessment mutex poisoned")
            .insert(assessment.supplier_id.clone(), assessment);
        Ok(())
    }

    fn risk_assessment(
        &self,
        supplier_id: &SupplierId,
    ) -> Result<Option<RiskAssessment>, RepositoryError> {
        let guard = self.assessments.lock().expect("assessment mutex poisoned");
        Ok(guard.get(supplier_id).cloned())
    }

    fn grant_badge(&self, badge: Badge) -> Result<(), RepositoryError> {
        self.badges
            .lock()
            .expect("badge mutex poisoned")
            .insert(badge.supplier_id.clone(), badge);
        Ok(())
    }

    fn badge(&self, supplier_id: &SupplierId) -> Result<Option<Badge>, RepositoryError> {
        let guard = self.badges.lock().expect("badge mutex poisoned");
        Ok(guard.get(supplier_id).cloned())
    }

    fn append_log(&self, entry: VerificationLogEntry) -> Result<(), RepositoryError> {
        self.log.lock().expect("log mutex poisoned").push(entry);
        Ok(())
    }

    fn log(&self, supplier_id: &SupplierId) -> Result<Vec<VerificationLogEntry>, RepositoryError> {
        let guard = self.log.lock().expect("log mutex poisoned");
        Ok(guard
            .iter()
            .filter(|entry| &entry.supplier_id == supplier_id)
            .cloned()
            .collect())
    }

    fn set_user_kyb_status(
        &self,
        supplier_id: &SupplierId,
        status: UserKybStatus,
    ) -> Result<(), RepositoryError> {
        self.user_statuses
            .lock()
            .expect("user status mutex poisoned")
            .insert(supplier_id.clone(), status);
        Ok(())
    }
}

/// Sink capturing admin notices so callers can assert the fan-out boundary.
#[derive(Default)]
pub struct RecordingNotificationSink {
    notices: Mutex<Vec<AdminNotice>>,
}

impl RecordingNotificationSink {
    pub fn notices(&self) -> Vec<AdminNotice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn notify_admins(&self, notice: AdminNotice) -> Result<(), NotificationError> {
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}
