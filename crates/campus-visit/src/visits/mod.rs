//! Campus visit applications: intake, the one-shot audit workflow and filtered paging.
//!
//! All three operations run against one injected [`VisitStore`]; the audit transition is
//! enforced by the store's conditional update so racing reviewers cannot both succeed.

pub mod audit;
pub mod domain;
pub mod error;
pub mod filter;
pub mod intake;
pub mod memory;
pub mod pager;
pub mod router;
pub mod service;
pub mod sqlite;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use audit::{AuditEngine, AuditReceipt};
pub use domain::{
    ApplicationId, AuditTrail, NewVisitRecord, StatusChange, VisitApplication, VisitDetails,
    VisitStatus,
};
pub use error::VisitError;
pub use filter::{FilterField, FilterOp, Predicate, PredicateSet, VisitFilter};
pub use intake::IntakeDesk;
pub use memory::InMemoryVisitStore;
pub use pager::{FilteredPager, PageQuery, VisitPage, DEFAULT_MAX_PAGE_SIZE};
pub use router::visit_router;
pub use service::VisitApplicationService;
pub use sqlite::SqliteVisitStore;
pub use store::{StoreError, VisitStore};
pub use validation::{AuditRequest, VisitSubmission};
