use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use talentwatch::config::AppConfig;
use talentwatch::error::AppError;
use talentwatch::telemetry;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::{with_tracking_routes, SnapshotGateway};

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

    let handles = build_service(config.tracking.clone());
    let gateway = SnapshotGateway {
        service: handles.service.clone(),
        fetcher: handles.fetcher,
    };

    let app = with_tracking_routes(handles.service)
        .layer(Extension(app_state))
        .layer(Extension(gateway))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, min_alert_level = config.tracking.min_alert_level.value(), "talentwatch tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
