use std::sync::Arc;

use chrono::Local;
use tracing::info;

use super::domain::{NewVisitRecord, VisitApplication};
use super::error::VisitError;
use super::store::VisitStore;
use super::validation::{validate_submission, VisitSubmission};

/// Validates visitor submissions and hands them to the store as Pending records.
pub struct IntakeDesk<S: ?Sized> {
    store: Arc<S>,
}

impl<S> IntakeDesk<S>
where
    S: VisitStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn submit(&self, submission: VisitSubmission) -> Result<VisitApplication, VisitError> {
        let details = validate_submission(submission)?;
        let record = NewVisitRecord::new(details, Local::now().naive_local());
        let id = self.store.insert(record.clone())?;

        info!(application_id = %id, visit_unit = %record.details.visit_unit, "visit application received");
        Ok(record.into_application(id))
    }
}
