use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::visits::domain::{
    ApplicationId, NewVisitRecord, StatusChange, VisitApplication, VisitStatus,
};
use crate::visits::filter::PredicateSet;
use crate::visits::memory::InMemoryVisitStore;
use crate::visits::store::{StoreError, VisitStore};
use crate::visits::validation::{AuditRequest, VisitSubmission};
use crate::visits::VisitApplicationService;

pub(super) fn submission(unit: &str, contact: &str, phone: &str) -> VisitSubmission {
    VisitSubmission {
        visit_date: Some("2025-11-03".to_string()),
        visit_unit: Some(unit.to_string()),
        visit_nature: Some(1),
        visit_num: Some(30),
        visit_car: Some("川A12345".to_string()),
        contact_name: Some(contact.to_string()),
        contact_phone: Some(phone.to_string()),
        time_slot: None,
    }
}

pub(super) fn default_submission() -> VisitSubmission {
    submission("Tianfu Middle School", "Li Wei", "13800138000")
}

pub(super) fn approve(id: ApplicationId) -> AuditRequest {
    AuditRequest {
        id: Some(id.0),
        status: Some(i64::from(VisitStatus::Approved.code())),
        commentator_name: Some("Zhao Min".to_string()),
        commentator_phone: Some("13900000000".to_string()),
        reject_reason: None,
        update_by: Some("admin".to_string()),
    }
}

pub(super) fn reject(id: ApplicationId, reason: &str) -> AuditRequest {
    AuditRequest {
        id: Some(id.0),
        status: Some(i64::from(VisitStatus::Rejected.code())),
        commentator_name: Some("Zhao Min".to_string()),
        commentator_phone: None,
        reject_reason: Some(reason.to_string()),
        update_by: Some("admin".to_string()),
    }
}

pub(super) fn cancel(id: ApplicationId) -> AuditRequest {
    AuditRequest {
        id: Some(id.0),
        status: Some(i64::from(VisitStatus::Cancelled.code())),
        commentator_name: None,
        commentator_phone: None,
        reject_reason: Some("ignored for cancellations".to_string()),
        update_by: Some("desk".to_string()),
    }
}

pub(super) fn build_service() -> (
    VisitApplicationService<InMemoryVisitStore>,
    Arc<InMemoryVisitStore>,
) {
    let store = Arc::new(InMemoryVisitStore::new());
    let service = VisitApplicationService::new(store.clone());
    (service, store)
}

/// Submit `count` applications with distinct units and contacts.
pub(super) fn seed(
    service: &VisitApplicationService<InMemoryVisitStore>,
    count: usize,
) -> Vec<ApplicationId> {
    (0..count)
        .map(|index| {
            let unit = format!("School {index:02}");
            let contact = format!("Contact {index:02}");
            let phone = format!("1380000{index:04}");
            service
                .submit(submission(&unit, &contact, &phone))
                .expect("seed submission accepted")
                .id
        })
        .collect()
}

/// Delegates to an in-memory store while counting mutating calls.
#[derive(Default)]
pub(super) struct CountingStore {
    pub(super) inner: InMemoryVisitStore,
    writes: AtomicUsize,
    lists: AtomicUsize,
}

impl CountingStore {
    pub(super) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub(super) fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }
}

impl VisitStore for CountingStore {
    fn insert(&self, record: NewVisitRecord) -> Result<ApplicationId, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(record)
    }

    fn find_by_id(&self, id: ApplicationId) -> Result<Option<VisitApplication>, StoreError> {
        self.inner.find_by_id(id)
    }

    fn update_status_if(
        &self,
        id: ApplicationId,
        expected: VisitStatus,
        change: &StatusChange,
    ) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update_status_if(id, expected, change)
    }

    fn count(&self, predicates: &PredicateSet) -> Result<u64, StoreError> {
        self.inner.count(predicates)
    }

    fn list(
        &self,
        predicates: &PredicateSet,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<VisitApplication>, StoreError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list(predicates, offset, limit)
    }

    fn soft_delete(&self, id: ApplicationId) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.soft_delete(id)
    }
}

pub(super) struct UnavailableStore;

impl VisitStore for UnavailableStore {
    fn insert(&self, _record: NewVisitRecord) -> Result<ApplicationId, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn find_by_id(&self, _id: ApplicationId) -> Result<Option<VisitApplication>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update_status_if(
        &self,
        _id: ApplicationId,
        _expected: VisitStatus,
        _change: &StatusChange,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn count(&self, _predicates: &PredicateSet) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn list(
        &self,
        _predicates: &PredicateSet,
        _offset: u64,
        _limit: u64,
    ) -> Result<Vec<VisitApplication>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn soft_delete(&self, _id: ApplicationId) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
