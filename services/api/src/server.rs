use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySessionStore, RegistryGateway};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use business_filings::config::AppConfig;
use business_filings::error::AppError;
use business_filings::filings::{FilingService, ResourceRegistry};
use business_filings::telemetry;
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

    // Descriptor tables are validated before the listener binds.
    let resources = Arc::new(ResourceRegistry::standard()?);
    let gateway = Arc::new(RegistryGateway::from_config(&config.registry)?);
    info!(
        registry = gateway.label(),
        resources = resources.iter().count(),
        "filing resources loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let sessions = Arc::new(InMemorySessionStore::default());
    let filing_service = Arc::new(FilingService::new(
        resources,
        sessions,
        gateway.clone(),
        gateway,
    ));

    let app = with_operational_routes(filing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "business filings service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
