use crate::cli::ServeArgs;
use crate::infra::{AppState, Services};
use crate::routes::with_colive_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use colive::config::AppConfig;
use colive::error::AppError;
use colive::telemetry;
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

    let services = Services::seeded(&config)?;
    let app = with_colive_routes(&services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        member_discount = %config.pricing.member_discount_percent,
        guest_increase = %config.pricing.guest_increase_percent,
        "coliving service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
