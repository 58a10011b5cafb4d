use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use tracing::error;

use super::domain::{ApplicationId, NewVisitRecord, StatusChange, VisitApplication, VisitStatus};
use super::filter::PredicateSet;
use super::store::{StoreError, VisitStore};

/// Process-local store keyed by id. Every operation runs under one lock.
#[derive(Debug, Default)]
pub struct InMemoryVisitStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_id: i64,
    records: BTreeMap<ApplicationId, VisitApplication>,
}

impl InMemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record, deleted ones included.
    pub fn snapshot(&self) -> Result<Vec<VisitApplication>, StoreError> {
        let state = self.lock()?;
        Ok(state.records.values().cloned().collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| {
                error!("visit store mutex poisoned");
                StoreError::Unavailable("visit store mutex poisoned".to_string())
            })
    }
}

impl VisitStore for InMemoryVisitStore {
    fn insert(&self, record: NewVisitRecord) -> Result<ApplicationId, StoreError> {
        let mut state = self.lock()?;
        state.last_id += 1;
        let id = ApplicationId(state.last_id);
        state.records.insert(id, record.into_application(id));
        Ok(id)
    }

    fn find_by_id(&self, id: ApplicationId) -> Result<Option<VisitApplication>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .records
            .get(&id)
            .filter(|record| !record.deleted)
            .cloned())
    }

    fn update_status_if(
        &self,
        id: ApplicationId,
        expected: VisitStatus,
        change: &StatusChange,
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let record = state
            .records
            .get_mut(&id)
            .filter(|record| !record.deleted)
            .ok_or(StoreError::NotFound(id))?;

        if record.status != expected {
            return Err(StoreError::Conflict {
                id,
                current: record.status,
            });
        }

        change.apply(record);
        Ok(())
    }

    fn count(&self, predicates: &PredicateSet) -> Result<u64, StoreError> {
        let state = self.lock()?;
        let total = state
            .records
            .values()
            .filter(|record| predicates.matches(record))
            .count();
        Ok(total as u64)
    }

    fn list(
        &self,
        predicates: &PredicateSet,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<VisitApplication>, StoreError> {
        let state = self.lock()?;
        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(state
            .records
            .values()
            .filter(|record| predicates.matches(record))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn soft_delete(&self, id: ApplicationId) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let record = state
            .records
            .get_mut(&id)
            .filter(|record| !record.deleted)
            .ok_or(StoreError::NotFound(id))?;
        record.deleted = true;
        Ok(())
    }
}
