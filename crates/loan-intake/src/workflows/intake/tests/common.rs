use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::intake::academic::{
    AcademicKyc, CourseTest, CourseTestType, EducationLevel, EducationRecord, LanguageTest,
    LanguageTestType, MonthYear, TestGiven,
};
use crate::workflows::intake::domain::{
    AdmissionKyc, CanonicalRecord, CoSignatory, CoSignatoryChoice, CourseLevel, IdDocumentType,
    MobileVerification, OfferLetterType, PersonalKyc, RecordPatch, StudyPreferences, UserId,
    WorkEmployment,
};
use crate::workflows::intake::extraction::{
    DocumentContent, DocumentExtractor, DocumentKind, ExtractedDocument, ExtractedFields,
};
use crate::workflows::intake::router::{intake_router, IntakeRouterState};
use crate::workflows::intake::service::IntakeService;
use crate::workflows::intake::store::{RecordStore, StoreError};
use crate::workflows::lenders::{Lender, MatchConfig, RecommendationEngine, StaticLenderCatalog};

pub(super) fn user() -> UserId {
    UserId("student-42".to_string())
}

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

pub(super) fn edited_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 15, 10, 30, 0).single().expect("valid timestamp")
}

pub(super) fn indian_mobile() -> MobileVerification {
    MobileVerification {
        number: Some("9876543210".to_string()),
        dial_code: Some("+91".to_string()),
        country_short_name: Some("IN".to_string()),
        verified: true,
    }
}

pub(super) fn us_mobile() -> MobileVerification {
    MobileVerification {
        number: Some("5551234567".to_string()),
        dial_code: Some("+1".to_string()),
        country_short_name: Some("US".to_string()),
        verified: true,
    }
}

pub(super) fn admission_complete() -> AdmissionKyc {
    AdmissionKyc {
        has_offer_letter: Some(true),
        student_name: Some("Asha Verma".to_string()),
        university_name: Some("University of Toronto".to_string()),
        course_name: Some("MSc Computer Science".to_string()),
        admission_level: Some("Postgraduate".to_string()),
        admission_fees: Some("$20,000 USD per year".to_string()),
        fees_currency: Some("USD".to_string()),
        course_start_date: NaiveDate::from_ymd_opt(2025, 9, 1),
        offer_letter_type: Some(OfferLetterType::Unconditional),
        offer_letter_doc_ref: Some("drive://offers/student-42".to_string()),
    }
}

pub(super) fn personal_complete() -> PersonalKyc {
    PersonalKyc {
        id_document_type: Some(IdDocumentType::Pan),
        id_number: Some("ABCDE1234F".to_string()),
        passport_number: Some("N1234567".to_string()),
        date_of_birth: NaiveDate::from_ymd_opt(2001, 3, 10),
        age_in_years: None,
        country_of_user: Some("India".to_string()),
        permanent_address: Some("12 MG Road, Pune".to_string()),
        doc_refs: vec!["drive://ids/student-42".to_string()],
    }
}

pub(super) fn academic_complete() -> AcademicKyc {
    AcademicKyc {
        graduation: EducationRecord {
            level: Some(EducationLevel::Degree),
            percentage: Some(78.5),
            completed_on: MonthYear {
                month: Some(6),
                year: Some(2022),
            },
            ..EducationRecord::default()
        },
        post_graduation: EducationRecord {
            level: Some(EducationLevel::NotApplicable),
            ..EducationRecord::default()
        },
        language_test: LanguageTest {
            given: Some(TestGiven::Yes),
            test_type: Some(LanguageTestType::Ielts),
            score: None,
            meets_threshold: Some(true),
            test_date: NaiveDate::from_ymd_opt(2025, 1, 20),
        },
        course_test: CourseTest {
            given: Some(TestGiven::Yes),
            test_type: Some(CourseTestType::Gre),
            score: Some("321".to_string()),
            test_date: NaiveDate::from_ymd_opt(2025, 2, 2),
        },
    }
}

pub(super) fn co_signatory_complete() -> CoSignatory {
    CoSignatory {
        choice: Some(CoSignatoryChoice::Yes),
        id_doc_ref: Some("drive://cosig/student-42".to_string()),
        relationship: Some("Father".to_string()),
        extracted_id_number: None,
        extracted_name: None,
    }
}

pub(super) fn work_employment_complete() -> WorkEmployment {
    WorkEmployment {
        industry: Some("Software".to_string()),
        years_experience: Some(3),
        months_experience: Some(4),
        proof_type: None,
        extracted_years: None,
        extracted_industry: None,
        currently_working: Some(true),
        monthly_salary: Some(95000.0),
        currency: Some("INR".to_string()),
    }
}

pub(super) fn preferences_complete() -> StudyPreferences {
    StudyPreferences {
        country1: Some("Canada".to_string()),
        country2: Some("Ireland".to_string()),
        course_level: Some(CourseLevel::Postgraduate),
        course_name: Some("Computer Science".to_string()),
    }
}

pub(super) fn sample_lenders() -> Vec<Lender> {
    vec![
        Lender {
            name: "Axis Bank".to_string(),
            base_country: Some("India".to_string()),
            loan_currency: Some("INR".to_string()),
            interest_rate: Some("10.5%".to_string()),
            website: Some("https://axisbank.example".to_string()),
        },
        Lender {
            name: "Avanse".to_string(),
            base_country: None,
            loan_currency: Some("INR".to_string()),
            interest_rate: None,
            website: None,
        },
        Lender {
            name: "Prodigy Finance".to_string(),
            base_country: None,
            loan_currency: Some("USD".to_string()),
            interest_rate: Some("12%".to_string()),
            website: Some("https://prodigy.example".to_string()),
        },
        Lender {
            name: "Sallie Mae".to_string(),
            base_country: Some("United States".to_string()),
            loan_currency: Some("USD".to_string()),
            interest_rate: None,
            website: None,
        },
    ]
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    pub(super) records: Arc<Mutex<HashMap<UserId, CanonicalRecord>>>,
}

impl RecordStore for MemoryStore {
    fn save(&self, user_id: &UserId, patch: RecordPatch) -> Result<CanonicalRecord, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let existing = guard
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| CanonicalRecord::new(user_id.clone()));
        let merged = existing.merged(patch);
        guard.insert(user_id.clone(), merged.clone());
        Ok(merged)
    }

    fn fetch(&self, user_id: &UserId) -> Result<Option<CanonicalRecord>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(user_id).cloned())
    }
}

pub(super) struct UnavailableStore;

impl RecordStore for UnavailableStore {
    fn save(&self, _user_id: &UserId, _patch: RecordPatch) -> Result<CanonicalRecord, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _user_id: &UserId) -> Result<Option<CanonicalRecord>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Extractor returning fixed payloads per document kind, with offer
/// letters carrying a sentinel-laced admission payload.
#[derive(Default, Clone)]
pub(super) struct CannedExtractor;

impl DocumentExtractor for CannedExtractor {
    fn extract(&self, kind: DocumentKind, _content: &DocumentContent) -> ExtractedDocument {
        match kind {
            DocumentKind::OfferLetter => ExtractedDocument::succeeded(
                kind,
                ExtractedFields::Admission(AdmissionKyc {
                    student_name: Some("Asha Verma".to_string()),
                    university_name: Some("University of Toronto".to_string()),
                    course_name: Some("Not Specified".to_string()),
                    admission_fees: Some("$20,000 USD per year".to_string()),
                    ..AdmissionKyc::default()
                }),
            ),
            DocumentKind::PanCard | DocumentKind::NationalId | DocumentKind::Passport => {
                ExtractedDocument::succeeded(
                    kind,
                    ExtractedFields::Personal(PersonalKyc {
                        id_number: Some("ABCDE1234F".to_string()),
                        date_of_birth: NaiveDate::from_ymd_opt(2001, 3, 10),
                        ..PersonalKyc::default()
                    }),
                )
            }
            DocumentKind::CoSignatoryId => ExtractedDocument::succeeded(
                kind,
                ExtractedFields::CoSignatory(CoSignatory {
                    extracted_id_number: Some("FGHIJ5678K".to_string()),
                    extracted_name: Some("Rajesh Verma".to_string()),
                    ..CoSignatory::default()
                }),
            ),
            DocumentKind::Resume => ExtractedDocument::failed(kind),
        }
    }
}

/// Extractor that fails every document, standing in for a backend outage.
pub(super) struct FailingExtractor;

impl DocumentExtractor for FailingExtractor {
    fn extract(&self, kind: DocumentKind, _content: &DocumentContent) -> ExtractedDocument {
        ExtractedDocument::failed(kind)
    }
}

pub(super) fn build_service() -> (IntakeService<MemoryStore, CannedExtractor>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = IntakeService::new(store.clone(), Arc::new(CannedExtractor));
    (service, store)
}

pub(super) fn router_state(
    service: IntakeService<MemoryStore, CannedExtractor>,
) -> IntakeRouterState<MemoryStore, CannedExtractor, StaticLenderCatalog> {
    IntakeRouterState {
        service: Arc::new(service),
        catalog: Arc::new(StaticLenderCatalog::new(sample_lenders())),
        engine: RecommendationEngine::new(MatchConfig::default()),
    }
}

pub(super) fn intake_router_with_service(
    service: IntakeService<MemoryStore, CannedExtractor>,
) -> axum::Router {
    intake_router(router_state(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// A record that has walked the loan track up to the professional review.
pub(super) fn loan_record_before_review() -> CanonicalRecord {
    let mut record = CanonicalRecord::new(user());
    record.mobile = Some(indian_mobile());
    record.admission_kyc = Some(admission_complete());
    let mut personal = personal_complete();
    personal.recompute_age(today());
    record.personal_kyc = Some(personal);
    record.academic_kyc = Some(academic_complete());
    record.professional_kyc = Some(crate::workflows::intake::domain::ProfessionalKyc {
        co_signatory: Some(co_signatory_complete()),
        work_employment: Some(work_employment_complete()),
    });
    record
}
