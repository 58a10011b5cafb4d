use super::domain::{ApplicationId, VisitStatus};
use super::store::StoreError;

/// Outcomes surfaced to callers of the intake, audit and paging operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisitError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("visit application {0} not found")]
    NotFound(ApplicationId),
    #[error("visit application {id} was already audited ({current})")]
    AlreadyAudited {
        id: ApplicationId,
        current: VisitStatus,
    },
    #[error("visit store unavailable: {0}")]
    StoreUnavailable(String),
}

impl VisitError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<StoreError> for VisitError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            StoreError::Conflict { id, current } => Self::AlreadyAudited { id, current },
            StoreError::Unavailable(reason) => Self::StoreUnavailable(reason),
        }
    }
}
