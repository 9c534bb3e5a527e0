use crate::cli::ServeArgs;
use crate::infra::{built_in_lender_catalog, AppState, InMemoryRecordStore, LabelledTextExtractor};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use loan_intake::config::AppConfig;
use loan_intake::error::AppError;
use loan_intake::telemetry;
use loan_intake::workflows::intake::{IntakeRouterState, IntakeService};
use loan_intake::workflows::lenders::{MatchConfig, RecommendationEngine, StaticLenderCatalog};
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

    let store = Arc::new(InMemoryRecordStore::default());
    let extractor = Arc::new(LabelledTextExtractor);
    let service = Arc::new(IntakeService::new(store, extractor));

    let catalog = match config.catalog.lender_catalog.as_deref() {
        Some(path) => StaticLenderCatalog::from_path(path)?,
        None => built_in_lender_catalog(),
    };
    let catalog_size = catalog.len();

    let state = IntakeRouterState {
        service,
        catalog: Arc::new(catalog),
        engine: RecommendationEngine::new(MatchConfig::default()),
    };

    let app = with_intake_routes(state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, catalog_size, "loan intake orchestrator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
