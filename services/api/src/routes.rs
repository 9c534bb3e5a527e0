use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use loan_intake::workflows::intake::{
    intake_router, DocumentExtractor, IntakeRouterState, RecordStore,
};
use loan_intake::workflows::lenders::{estimate_loan_amount, LenderCatalog, MatchConfig};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoanEstimateRequest {
    pub(crate) admission_fees: String,
    #[serde(default)]
    pub(crate) fees_currency: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoanEstimateResponse {
    pub(crate) admission_fees: String,
    pub(crate) estimated_loan_amount: String,
    pub(crate) available: bool,
}

pub(crate) fn with_intake_routes<S, X, L>(state: IntakeRouterState<S, X, L>) -> axum::Router
where
    S: RecordStore + 'static,
    X: DocumentExtractor + 'static,
    L: LenderCatalog + 'static,
{
    intake_router(state)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/lenders/estimate",
            axum::routing::post(loan_estimate_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Stateless fee-to-loan preview for screens shown before a record
/// exists. Uses the same estimation rules as the per-applicant
/// recommendations route.
pub(crate) async fn loan_estimate_endpoint(
    Json(payload): Json<LoanEstimateRequest>,
) -> Json<LoanEstimateResponse> {
    let estimate = estimate_loan_amount(
        &payload.admission_fees,
        payload.fees_currency.as_deref(),
        &MatchConfig::default(),
    );
    Json(LoanEstimateResponse {
        available: estimate.is_available(),
        estimated_loan_amount: estimate.to_string(),
        admission_fees: payload.admission_fees,
    })
}
