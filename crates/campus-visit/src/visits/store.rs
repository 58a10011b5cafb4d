use std::sync::Arc;

use super::domain::{ApplicationId, NewVisitRecord, StatusChange, VisitApplication, VisitStatus};
use super::filter::PredicateSet;

/// Persistence boundary for visit applications.
///
/// Soft-deleted records are invisible to every read and to the conditional update; they
/// are never physically removed. Listings are ordered by ascending id.
pub trait VisitStore: Send + Sync {
    fn insert(&self, record: NewVisitRecord) -> Result<ApplicationId, StoreError>;

    fn find_by_id(&self, id: ApplicationId) -> Result<Option<VisitApplication>, StoreError>;

    /// Apply `change` only if the record is present, not deleted and currently `expected`.
    ///
    /// The check and the write are one indivisible step with respect to other callers.
    fn update_status_if(
        &self,
        id: ApplicationId,
        expected: VisitStatus,
        change: &StatusChange,
    ) -> Result<(), StoreError>;

    fn count(&self, predicates: &PredicateSet) -> Result<u64, StoreError>;

    fn list(
        &self,
        predicates: &PredicateSet,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<VisitApplication>, StoreError>;

    fn soft_delete(&self, id: ApplicationId) -> Result<(), StoreError>;
}

impl<S> VisitStore for Arc<S>
where
    S: VisitStore + ?Sized,
{
    fn insert(&self, record: NewVisitRecord) -> Result<ApplicationId, StoreError> {
        (**self).insert(record)
    }

    fn find_by_id(&self, id: ApplicationId) -> Result<Option<VisitApplication>, StoreError> {
        (**self).find_by_id(id)
    }

    fn update_status_if(
        &self,
        id: ApplicationId,
        expected: VisitStatus,
        change: &StatusChange,
    ) -> Result<(), StoreError> {
        (**self).update_status_if(id, expected, change)
    }

    fn count(&self, predicates: &PredicateSet) -> Result<u64, StoreError> {
        (**self).count(predicates)
    }

    fn list(
        &self,
        predicates: &PredicateSet,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<VisitApplication>, StoreError> {
        (**self).list(predicates, offset, limit)
    }

    fn soft_delete(&self, id: ApplicationId) -> Result<(), StoreError> {
        (**self).soft_delete(id)
    }
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(ApplicationId),
    #[error("record {id} is already {current}")]
    Conflict {
        id: ApplicationId,
        current: VisitStatus,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
