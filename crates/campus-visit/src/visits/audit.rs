use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{ApplicationId, StatusChange, VisitStatus};
use super::error::VisitError;
use super::store::VisitStore;
use super::validation::{validate_audit, AuditCommand, AuditRequest};

/// Applies a reviewer decision to a pending application, at most once.
pub struct AuditEngine<S: ?Sized> {
    store: Arc<S>,
}

/// Acknowledgement of an applied decision. The caller re-reads the record if it needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditReceipt {
    pub id: ApplicationId,
    pub status: VisitStatus,
    pub message: String,
}

impl<S> AuditEngine<S>
where
    S: VisitStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn audit(&self, request: AuditRequest) -> Result<AuditReceipt, VisitError> {
        let command = validate_audit(request)?;
        self.apply(command)
    }

    fn apply(&self, command: AuditCommand) -> Result<AuditReceipt, VisitError> {
        let id = command.id;
        let current = self
            .store
            .find_by_id(id)?
            .ok_or(VisitError::NotFound(id))?;

        if !current.is_pending() {
            warn!(application_id = %id, current = %current.status, "audit refused: already audited");
            return Err(VisitError::AlreadyAudited {
                id,
                current: current.status,
            });
        }

        let target = command.target;
        let change = StatusChange {
            status: target,
            commentator_name: command.commentator_name,
            commentator_phone: command.commentator_phone,
            reject_reason: command.reject_reason,
            update_by: command.update_by,
            update_time: Local::now().naive_local(),
        };

        // The read above only gives an early answer; the store re-checks Pending atomically.
        if let Err(err) = self
            .store
            .update_status_if(id, VisitStatus::Pending, &change)
        {
            let err = VisitError::from(err);
            warn!(application_id = %id, error = %err, "audit refused at store");
            return Err(err);
        }

        info!(application_id = %id, status = %target, update_by = %change.update_by, "audit applied");
        Ok(AuditReceipt {
            id,
            status: target,
            message: "Update successful".to_string(),
        })
    }
}
