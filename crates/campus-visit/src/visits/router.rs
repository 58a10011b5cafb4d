use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::ApplicationId;
use super::error::VisitError;
use super::pager::PageQuery;
use super::service::VisitApplicationService;
use super::store::VisitStore;
use super::validation::{AuditRequest, VisitSubmission};

/// Router builder exposing intake, audit and paging endpoints.
pub fn visit_router<S>(service: Arc<VisitApplicationService<S>>) -> Router
where
    S: VisitStore + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/visits", post(submit_handler::<S>))
        .route("/api/v1/visits/audit", post(audit_handler::<S>))
        .route("/api/v1/visits/page", get(page_handler::<S>))
        .route(
            "/api/v1/visits/:id",
            get(get_handler::<S>).delete(delete_handler::<S>),
        )
        .with_state(service)
}

pub(crate) fn status_for(error: &VisitError) -> StatusCode {
    match error {
        VisitError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        VisitError::NotFound(_) => StatusCode::NOT_FOUND,
        VisitError::AlreadyAudited { .. } => StatusCode::CONFLICT,
        VisitError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn failure(error: VisitError) -> Response {
    let payload = json!({
        "success": false,
        "message": error.to_string(),
    });
    (status_for(&error), Json(payload)).into_response()
}

/// Malformed bodies, query strings and ids get the same envelope as validation failures.
fn malformed(detail: String) -> Response {
    failure(VisitError::invalid(detail))
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<VisitApplicationService<S>>>,
    submission: Result<Json<VisitSubmission>, JsonRejection>,
) -> Response
where
    S: VisitStore + ?Sized + 'static,
{
    let Json(submission) = match submission {
        Ok(body) => body,
        Err(rejection) => return malformed(rejection.body_text()),
    };
    match service.submit(submission) {
        Ok(record) => {
            let payload = json!({
                "success": true,
                "message": "Application record added successfully",
                "id": record.id,
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(error) => failure(error),
    }
}

pub(crate) async fn audit_handler<S>(
    State(service): State<Arc<VisitApplicationService<S>>>,
    request: Result<Json<AuditRequest>, JsonRejection>,
) -> Response
where
    S: VisitStore + ?Sized + 'static,
{
    let Json(request) = match request {
        Ok(body) => body,
        Err(rejection) => return malformed(rejection.body_text()),
    };
    match service.audit(request) {
        Ok(receipt) => {
            let payload = json!({
                "success": true,
                "message": receipt.message,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => failure(error),
    }
}

pub(crate) async fn page_handler<S>(
    State(service): State<Arc<VisitApplicationService<S>>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Response
where
    S: VisitStore + ?Sized + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return malformed(rejection.body_text()),
    };
    match service.page(&query) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn get_handler<S>(
    State(service): State<Arc<VisitApplicationService<S>>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response
where
    S: VisitStore + ?Sized + 'static,
{
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return malformed(rejection.body_text()),
    };
    match service.get(ApplicationId(id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn delete_handler<S>(
    State(service): State<Arc<VisitApplicationService<S>>>,
    id: Result<Path<i64>, PathRejection>,
) -> Response
where
    S: VisitStore + ?Sized + 'static,
{
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return malformed(rejection.body_text()),
    };
    match service.remove(ApplicationId(id)) {
        Ok(()) => {
            let payload = json!({
                "success": true,
                "message": "Application record deleted",
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => failure(error),
    }
}
