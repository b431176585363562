use crate::cli::ServeArgs;
use crate::infra::{build_matching_service, load_seed, AppState};
use crate::routes::with_matching_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tutor_match::config::AppConfig;
use tutor_match::error::AppError;
use tutor_match::matching::{CancellationFlag, MatchingState};
use tutor_match::telemetry;

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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let seed = load_seed(&config.matching, Local::now().date_naive())?;
    let service = Arc::new(build_matching_service(&config.matching, seed)?);
    let shutdown = CancellationFlag::new();

    let app = with_matching_routes(MatchingState {
        service,
        shutdown: shutdown.clone(),
    })
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "tutor matching service ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown, readiness_flag))
        .await?;
    info!("tutor matching service stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationFlag, readiness: Arc<AtomicBool>) {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "unable to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    readiness.store(false, Ordering::Release);
    shutdown.cancel();
    info!("shutdown requested, cancelling in-flight matching");
}
