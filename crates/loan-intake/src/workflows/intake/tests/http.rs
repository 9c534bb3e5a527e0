use super::common::*;

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::workflows::intake::router::{self, IntakeRouterState};
use crate::workflows::intake::service::IntakeService;
use crate::workflows::lenders::{MatchConfig, RecommendationEngine, StaticLenderCatalog};

fn json_request(method: &str, uri: &str, payload: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn begin_creates_the_record_and_returns_it() {
    let (service, _store) = build_service();
    let router = intake_router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/intake/student-42/begin",
            json!({
                "number": "9876543210",
                "dialCode": "+91",
                "countryShortName": "IN",
                "verified": true
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["userId"], json!("student-42"));
    assert_eq!(body["mobile"]["dialCode"], json!("+91"));

    let response = router
        .oneshot(get_request("/api/v1/intake/student-42"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn fetching_an_unknown_record_is_not_found() {
    let (service, _store) = build_service();
    let router = intake_router_with_service(service);

    let response = router
        .oneshot(get_request("/api/v1/intake/ghost"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], json!("applicant record not found"));
}

#[tokio::test]
async fn section_saves_round_trip_with_persisted_field_names() {
    let (service, _store) = build_service();
    service.begin(&user(), indian_mobile()).expect("begin");
    let router = intake_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/intake/student-42/sections",
            json!({
                "savedAt": "2025-06-15T10:30:00Z",
                "section": "admission",
                "edits": {
                    "hasOfferLetter": true,
                    "studentName": "Asha Verma",
                    "universityName": "University of Toronto",
                    "courseName": "MSc Computer Science",
                    "admissionLevel": "Postgraduate",
                    "admissionFees": "$20,000 USD per year",
                    "feesCurrency": "USD",
                    "courseStartDate": "2025-09-01",
                    "offerLetterType": "unconditional",
                    "offerLetterDocRef": "drive://offers/student-42"
                }
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["section"], json!("admissionKyc"));
    assert_eq!(body["sectionComplete"], json!(true));
    assert_eq!(body["record"]["admissionKyc"]["hasOfferLetter"], json!(true));
    assert_eq!(
        body["record"]["admissionKyc"]["courseStartDate"],
        json!("2025-09-01")
    );
    assert_eq!(
        body["record"]["provenance"]["admissionKyc.studentName"]["source"],
        json!("user")
    );
    assert_eq!(
        body["record"]["provenance"]["admissionKyc.studentName"]["editedAt"],
        json!("2025-06-15T10:30:00Z")
    );
}

#[tokio::test]
async fn saving_a_section_for_a_missing_record_is_not_found() {
    let (service, _store) = build_service();
    let router = intake_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/intake/ghost/sections",
            json!({
                "section": "preferences",
                "edits": { "country1": "Canada" }
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn consent_for_an_incomplete_section_is_unprocessable() {
    let (service, _store) = build_service();
    service.begin(&user(), indian_mobile()).expect("begin");
    let router = intake_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/intake/student-42/consent",
            json!({
                "section": "professionalKyc",
                "confirmedAt": "2025-06-15T10:30:00Z"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(
        body["error"],
        json!("consent requires a complete Professional KYC section")
    );
}

#[tokio::test]
async fn consent_lands_in_the_record_timestamps() {
    let (service, store) = build_service();
    store
        .records
        .lock()
        .expect("store mutex poisoned")
        .insert(user(), loan_record_before_review());
    let router = intake_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/intake/student-42/consent",
            json!({
                "section": "professionalKyc",
                "confirmedAt": "2025-06-15T10:30:00Z"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(
        body["consentTimestamps"]["professionalKyc"],
        json!("2025-06-15T10:30:00Z")
    );
}

#[tokio::test]
async fn advance_reports_the_routed_destination() {
    let (service, store) = build_service();
    let mut record = loan_record_before_review();
    record
        .consent_timestamps
        .insert(crate::workflows::intake::domain::SectionKind::ProfessionalKyc, edited_at());
    store
        .records
        .lock()
        .expect("store mutex poisoned")
        .insert(user(), record);
    let router = intake_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/intake/student-42/advance",
            json!({
                "applicationType": "loan",
                "currentStep": "review_professional_kyc",
                "today": "2025-06-15"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["from"], json!("review_professional_kyc"));
    assert_eq!(body["to"], json!("lender_recommendations"));
    assert_eq!(body["moved"], json!(true));
}

#[tokio::test]
async fn progress_lists_every_step_and_academic_sub_step() {
    let (service, store) = build_service();
    store
        .records
        .lock()
        .expect("store mutex poisoned")
        .insert(user(), loan_record_before_review());
    let router = intake_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/intake/student-42/progress",
            json!({
                "applicationType": "loan",
                "currentStep": "work_employment_kyc",
                "today": "2025-06-15"
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["steps"].as_array().map(Vec::len), Some(10));
    assert_eq!(body["academicSubSteps"].as_array().map(Vec::len), Some(4));
    assert_eq!(body["resumeStep"], json!("review_professional_kyc"));
    assert_eq!(body["nextStep"], json!("review_professional_kyc"));
    assert_eq!(body["steps"][0]["state"], json!("complete"));
}

#[tokio::test]
async fn extraction_endpoint_returns_the_document_payload() {
    let (service, _store) = build_service();
    let router = intake_router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/intake/documents/extract",
            json!({
                "kind": "offer_letter",
                "content": { "uri": "drive://offers/student-42" }
            }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], json!("succeeded"));
    assert_eq!(
        body["fields"]["admission"]["studentName"],
        json!("Asha Verma")
    );
}

#[tokio::test]
async fn recommendations_bucket_the_catalog_for_the_applicant() {
    let (service, store) = build_service();
    store
        .records
        .lock()
        .expect("store mutex poisoned")
        .insert(user(), loan_record_before_review());
    let router = intake_router_with_service(service);

    let response = router
        .oneshot(get_request("/api/v1/intake/student-42/recommendations"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["homeCountry"], json!("india"));
    assert_eq!(body["estimatedLoanAmount"], json!("16000 - 17000 USD"));
    assert_eq!(body["domestic"][0]["name"], json!("Axis Bank"));
    assert_eq!(body["domestic"][1]["name"], json!("Avanse"));
    assert_eq!(body["domestic"][1]["scope"], json!("domestic"));
    assert_eq!(body["foreign"][0]["name"], json!("Prodigy Finance"));
    assert_eq!(body["foreign"][1]["name"], json!("Sallie Mae"));
}

#[tokio::test]
async fn store_outages_map_to_internal_errors() {
    let state = IntakeRouterState {
        service: Arc::new(IntakeService::new(
            Arc::new(UnavailableStore),
            Arc::new(CannedExtractor),
        )),
        catalog: Arc::new(StaticLenderCatalog::new(sample_lenders())),
        engine: RecommendationEngine::new(MatchConfig::default()),
    };

    let response = router::fetch_record::<UnavailableStore, CannedExtractor, StaticLenderCatalog>(
        State(state),
        Path("student-42".to_string()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], json!("record store unavailable"));
}
