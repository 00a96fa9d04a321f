use layup_list::config::AppConfig;
use layup_list::error::AppError;
use layup_list::store::{load_catalog_dir, InMemoryCatalog, InMemoryVoteStore};
use layup_list::LayupEngine;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

pub(crate) type Engine = LayupEngine<InMemoryVoteStore, InMemoryCatalog>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Command-line data directory first, then `APP_DATA_DIR`.
pub(crate) fn resolve_data_dir(config: &AppConfig, override_dir: Option<PathBuf>) -> Option<PathBuf> {
    override_dir.or_else(|| config.data_dir.clone())
}

/// Loads the catalog and replays recorded votes. Without a data directory
/// the engine starts with an empty catalog.
pub(crate) fn build_engine(config: &AppConfig, data_dir: Option<&Path>) -> Result<Engine, AppError> {
    let (catalog, seeds) = match data_dir {
        Some(dir) => load_catalog_dir(dir)?.into_catalog(),
        None => {
            warn!("no data directory configured, starting with an empty catalog");
            (InMemoryCatalog::default(), Vec::new())
        }
    };

    let engine = LayupEngine::new(
        Arc::new(InMemoryVoteStore::default()),
        Arc::new(catalog),
        &config.engine,
    );
    engine.replay(&seeds)?;
    Ok(engine)
}
