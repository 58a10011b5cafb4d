use campus_visit::config::{StoreBackend, StoreConfig};
use campus_visit::error::AppError;
use campus_visit::visits::{InMemoryVisitStore, SqliteVisitStore, VisitStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Open the configured store behind a trait object so the router stays backend-agnostic.
pub(crate) fn build_store(config: &StoreConfig) -> Result<Arc<dyn VisitStore>, AppError> {
    match config.backend {
        StoreBackend::Memory => {
            info!("visit store: in-memory");
            Ok(Arc::new(InMemoryVisitStore::new()))
        }
        StoreBackend::Sqlite => {
            let store = SqliteVisitStore::open(&config.database_path)?;
            info!(path = %config.database_path.display(), "visit store: sqlite");
            Ok(Arc::new(store))
        }
    }
}
