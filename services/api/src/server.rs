use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_pocketbook_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use pocketbook::books::Pocketbook;
use pocketbook::config::AppConfig;
use pocketbook::error::AppError;
use pocketbook::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let books = Arc::new(Pocketbook::connect(&config.storage, &config.enrichment).await?);

    let app = with_pocketbook_routes(books)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "pocketbook ready");

    axum::serve(listener, app).await?;
    Ok(())
}
