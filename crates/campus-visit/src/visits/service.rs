use std::sync::Arc;

use tracing::info;

use super::audit::{AuditEngine, AuditReceipt};
use super::domain::{ApplicationId, VisitApplication};
use super::error::VisitError;
use super::intake::IntakeDesk;
use super::pager::{FilteredPager, PageQuery, VisitPage, DEFAULT_MAX_PAGE_SIZE};
use super::store::VisitStore;
use super::validation::{AuditRequest, VisitSubmission};

/// Service composing intake, audit and paging over one injected store.
pub struct VisitApplicationService<S: ?Sized> {
    store: Arc<S>,
    intake: IntakeDesk<S>,
    audit: AuditEngine<S>,
    pager: FilteredPager<S>,
}

impl<S> VisitApplicationService<S>
where
    S: VisitStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_max_page_size(store, DEFAULT_MAX_PAGE_SIZE)
    }

    pub fn with_max_page_size(store: Arc<S>, max_page_size: u64) -> Self {
        Self {
            intake: IntakeDesk::new(store.clone()),
            audit: AuditEngine::new(store.clone()),
            pager: FilteredPager::with_max_page_size(store.clone(), max_page_size),
            store,
        }
    }

    /// Register a new visit application in Pending state.
    pub fn submit(&self, submission: VisitSubmission) -> Result<VisitApplication, VisitError> {
        self.intake.submit(submission)
    }

    /// Approve, reject or cancel a pending application.
    pub fn audit(&self, request: AuditRequest) -> Result<AuditReceipt, VisitError> {
        self.audit.audit(request)
    }

    pub fn page(&self, query: &PageQuery) -> Result<VisitPage, VisitError> {
        self.pager.query(query)
    }

    pub fn pager(&self) -> &FilteredPager<S> {
        &self.pager
    }

    pub fn get(&self, id: ApplicationId) -> Result<VisitApplication, VisitError> {
        let record = self.store.find_by_id(id)?.ok_or(VisitError::NotFound(id))?;
        Ok(record)
    }

    /// Soft delete: the record stays stored but disappears from every operation.
    pub fn remove(&self, id: ApplicationId) -> Result<(), VisitError> {
        self.store.soft_delete(id)?;
        info!(application_id = %id, "visit application soft-deleted");
        Ok(())
    }
}
