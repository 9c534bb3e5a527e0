use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::workflows::lenders::{LenderCatalog, RecommendationEngine};

use super::domain::{CanonicalRecord, MobileVerification, SectionKind, UserId};
use super::extraction::{DocumentContent, DocumentExtractor, DocumentKind};
use super::routing::{ApplicationType, WizardStep};
use super::service::{IntakeService, IntakeServiceError, SectionSubmission};
use super::store::RecordStore;

/// Shared state behind the intake endpoints: the wizard service plus the
/// lender catalog and matching engine used by the recommendations route.
pub struct IntakeRouterState<S, X, L> {
    pub service: Arc<IntakeService<S, X>>,
    pub catalog: Arc<L>,
    pub engine: RecommendationEngine,
}

impl<S, X, L> Clone for IntakeRouterState<S, X, L> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            catalog: Arc::clone(&self.catalog),
            engine: self.engine.clone(),
        }
    }
}

pub fn intake_router<S, X, L>(state: IntakeRouterState<S, X, L>) -> Router
where
    S: RecordStore + 'static,
    X: DocumentExtractor + 'static,
    L: LenderCatalog + 'static,
{
    Router::new()
        .route(
            "/api/v1/intake/documents/extract",
            post(extract_document::<S, X, L>),
        )
        .route("/api/v1/intake/:user_id/begin", post(begin_intake::<S, X, L>))
        .route("/api/v1/intake/:user_id", get(fetch_record::<S, X, L>))
        .route(
            "/api/v1/intake/:user_id/sections",
            post(save_section::<S, X, L>),
        )
        .route(
            "/api/v1/intake/:user_id/consent",
            post(confirm_section::<S, X, L>),
        )
        .route(
            "/api/v1/intake/:user_id/advance",
            post(advance_step::<S, X, L>),
        )
        .route(
            "/api/v1/intake/:user_id/progress",
            post(wizard_progress::<S, X, L>),
        )
        .route(
            "/api/v1/intake/:user_id/recommendations",
            get(lender_recommendations::<S, X, L>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveSectionRequest {
    #[serde(default)]
    pub(crate) saved_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub(crate) submission: SectionSubmission,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SaveSectionResponse {
    pub(crate) user_id: String,
    pub(crate) section: SectionKind,
    pub(crate) section_complete: bool,
    pub(crate) record: CanonicalRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConsentRequest {
    pub(crate) section: SectionKind,
    #[serde(default)]
    pub(crate) confirmed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdvanceRequest {
    pub(crate) application_type: ApplicationType,
    pub(crate) current_step: WizardStep,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExtractRequest {
    pub(crate) kind: DocumentKind,
    pub(crate) content: DocumentContent,
}

pub(crate) async fn begin_intake<S, X, L>(
    State(state): State<IntakeRouterState<S, X, L>>,
    Path(user_id): Path<String>,
    Json(payload): Json<MobileVerification>,
) -> Response
where
    S: RecordStore,
    X: DocumentExtractor,
    L: LenderCatalog,
{
    let user_id = UserId(user_id);
    match state.service.begin(&user_id, payload) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn fetch_record<S, X, L>(
    State(state): State<IntakeRouterState<S, X, L>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: RecordStore,
    X: DocumentExtractor,
    L: LenderCatalog,
{
    let user_id = UserId(user_id);
    match state.service.record(&user_id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn save_section<S, X, L>(
    State(state): State<IntakeRouterState<S, X, L>>,
    Path(user_id): Path<String>,
    Json(payload): Json<SaveSectionRequest>,
) -> Response
where
    S: RecordStore,
    X: DocumentExtractor,
    L: LenderCatalog,
{
    let user_id = UserId(user_id);
    let saved_at = payload.saved_at.unwrap_or_else(Utc::now);
    match state
        .service
        .save_section(&user_id, payload.submission, saved_at)
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(SaveSectionResponse {
                user_id: outcome.record.user_id.0.clone(),
                section: outcome.section,
                section_complete: outcome.section_complete,
                record: outcome.record,
            }),
        )
            .into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn confirm_section<S, X, L>(
    State(state): State<IntakeRouterState<S, X, L>>,
    Path(user_id): Path<String>,
    Json(payload): Json<ConsentRequest>,
) -> Response
where
    S: RecordStore,
    X: DocumentExtractor,
    L: LenderCatalog,
{
    let user_id = UserId(user_id);
    let confirmed_at = payload.confirmed_at.unwrap_or_else(Utc::now);
    match state
        .service
        .record_consent(&user_id, payload.section, confirmed_at)
    {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn advance_step<S, X, L>(
    State(state): State<IntakeRouterState<S, X, L>>,
    Path(user_id): Path<String>,
    Json(payload): Json<AdvanceRequest>,
) -> Response
where
    S: RecordStore,
    X: DocumentExtractor,
    L: LenderCatalog,
{
    let user_id = UserId(user_id);
    let today = payload.today.unwrap_or_else(|| Utc::now().date_naive());
    match state
        .service
        .advance(&user_id, payload.application_type, payload.current_step, today)
    {
        Ok(advance) => (StatusCode::OK, Json(advance)).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn wizard_progress<S, X, L>(
    State(state): State<IntakeRouterState<S, X, L>>,
    Path(user_id): Path<String>,
    Json(payload): Json<AdvanceRequest>,
) -> Response
where
    S: RecordStore,
    X: DocumentExtractor,
    L: LenderCatalog,
{
    let user_id = UserId(user_id);
    let today = payload.today.unwrap_or_else(|| Utc::now().date_naive());
    match state
        .service
        .progress(&user_id, payload.application_type, payload.current_step, today)
    {
        Ok(progress) => (StatusCode::OK, Json(progress)).into_response(),
        Err(err) => service_error(err),
    }
}

pub(crate) async fn extract_document<S, X, L>(
    State(state): State<IntakeRouterState<S, X, L>>,
    Json(payload): Json<ExtractRequest>,
) -> Response
where
    S: RecordStore,
    X: DocumentExtractor,
    L: LenderCatalog,
{
    let document = state.service.extract_document(payload.kind, &payload.content);
    (StatusCode::OK, Json(document)).into_response()
}

pub(crate) async fn lender_recommendations<S, X, L>(
    State(state): State<IntakeRouterState<S, X, L>>,
    Path(user_id): Path<String>,
) -> Response
where
    S: RecordStore,
    X: DocumentExtractor,
    L: LenderCatalog,
{
    let user_id = UserId(user_id);
    match state.service.record(&user_id) {
        Ok(record) => {
            let lenders = state.catalog.list();
            let recommendations = state.engine.recommend(&record, &lenders);
            (StatusCode::OK, Json(recommendations)).into_response()
        }
        Err(err) => service_error(err),
    }
}

fn service_error(err: IntakeServiceError) -> Response {
    match err {
        IntakeServiceError::RecordNotFound => (
            StatusCode::NOT_FOUND,
            Json(error_body("applicant record not found")),
        )
            .into_response(),
        IntakeServiceError::Consent(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(error_body(&err.to_string())),
        )
            .into_response(),
        IntakeServiceError::Store(err) => {
            error!(error = %err, "record store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_body("record store unavailable")),
            )
                .into_response()
        }
    }
}

fn error_body(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}
