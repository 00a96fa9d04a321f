use crate::cli::ServeArgs;
use crate::infra::{build_engine, resolve_data_dir, AppState};
use crate::routes::with_layup_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use layup_list::config::AppConfig;
use layup_list::error::AppError;
use layup_list::telemetry;
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

    let data_dir = resolve_data_dir(&config, args.data_dir.take());
    let engine = Arc::new(build_engine(&config, data_dir.as_deref())?);

    let app = with_layup_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        term = %config.engine.current_term,
        "layup list service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
