use crate::cli::ServeArgs;
use crate::infra::{build_store, AppState};
use crate::routes::with_visit_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use campus_visit::config::AppConfig;
use campus_visit::error::AppError;
use campus_visit::telemetry;
use campus_visit::visits::VisitApplicationService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = build_store(&config.store)?;
    let visit_service = Arc::new(VisitApplicationService::with_max_page_size(
        store,
        config.paging.max_page_size,
    ));

    let app = with_visit_routes(visit_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        backend = ?config.store.backend,
        max_page_size = config.paging.max_page_size,
        "campus visit service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
