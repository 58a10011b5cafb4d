use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use campus_visit::visits::{visit_router, VisitApplicationService, VisitStore};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_visit_routes<S>(service: Arc<VisitApplicationService<S>>) -> axum::Router
where
    S: VisitStore + ?Sized + 'static,
{
    visit_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use campus_visit::visits::InMemoryVisitStore;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app(ready: bool) -> (axum::Router, Arc<AtomicBool>) {
        let readiness = Arc::new(AtomicBool::new(ready));
        let recorder = PrometheusBuilder::new().build_recorder();
        let state = AppState {
            readiness: readiness.clone(),
            metrics: Arc::new(recorder.handle()),
        };
        let service = Arc::new(VisitApplicationService::new(Arc::new(
            InMemoryVisitStore::new(),
        )));
        (with_visit_routes(service).layer(Extension(state)), readiness)
    }

    async fn get(router: &axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        let status = response.status();
        let body = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body");
        (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let (router, readiness) = app(false);
        let (status, payload) = get(&router, "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload, json!({ "status": "initializing" }));

        readiness.store(true, Ordering::Release);
        let (status, payload) = get(&router, "/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload, json!({ "status": "ready" }));
    }

    #[tokio::test]
    async fn health_and_visit_routes_share_one_router() {
        let (router, _) = app(true);
        let (status, payload) = get(&router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload, json!({ "status": "ok" }));

        let (status, payload) = get(&router, "/api/v1/visits/page?currentPage=1&pageSize=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.get("total"), Some(&json!(0)));
        assert_eq!(payload.get("pages"), Some(&json!(0)));
    }
}
