use crate::infra::{
    built_in_lender_catalog, InMemoryBlobStore, InMemoryRecordStore, LabelledTextExtractor,
};
use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use clap::Args;
use loan_intake::error::AppError;
use loan_intake::workflows::intake::{
    AcademicKyc, AdmissionKyc, ApplicationType, BlobStore, BlobUpload, CanonicalRecord,
    CoSignatory, CoSignatoryChoice, CourseTest, DocumentContent, DocumentKind, EducationLevel,
    EducationRecord, EmploymentProofType, ExtractedFields, IdDocumentType, IntakeService,
    LanguageTest, LanguageTestType, MobileVerification, MonthYear, PersonalKyc, RecordStore,
    SectionKind, SectionSubmission, TestGiven, UserId, WizardStep, WorkEmployment,
};
use loan_intake::workflows::lenders::{
    AnnotatedLender, LenderCatalog, LenderRecommendations, MatchConfig, RecommendationEngine,
    StaticLenderCatalog,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Applicant identifier for the walkthrough record.
    #[arg(long, default_value = "demo-applicant")]
    pub(crate) applicant: String,
    /// Evaluation date for routing and progress (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Course start date for the admission details. Defaults to today + 150 days.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) course_start: Option<NaiveDate>,
    /// Optional lender catalog CSV export to rank at the end.
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Skip the lender recommendation portion of the demo.
    #[arg(long)]
    pub(crate) skip_recommendations: bool,
}

#[derive(Args, Debug)]
pub(crate) struct LenderRecommendArgs {
    /// Applicant home country used to split domestic and foreign lenders
    #[arg(long)]
    pub(crate) home_country: String,
    /// Admission fees text to estimate from, e.g. "USD 24,000 per year"
    #[arg(long)]
    pub(crate) fees: Option<String>,
    /// Stated fees currency; wins over anything detected in the fees text
    #[arg(long)]
    pub(crate) currency: Option<String>,
    /// Optional lender catalog CSV export (defaults to the built-in catalog)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) fn run_lender_recommend(args: LenderRecommendArgs) -> Result<(), AppError> {
    let LenderRecommendArgs {
        home_country,
        fees,
        currency,
        catalog,
    } = args;

    let (catalog, imported) = load_catalog_from_path(catalog)?;

    let mut record = CanonicalRecord::new(UserId("catalog-preview".to_string()));
    record.personal_kyc = Some(PersonalKyc {
        country_of_user: Some(home_country),
        ..PersonalKyc::default()
    });
    if fees.is_some() || currency.is_some() {
        record.admission_kyc = Some(AdmissionKyc {
            admission_fees: fees,
            fees_currency: currency,
            ..AdmissionKyc::default()
        });
    }

    let engine = RecommendationEngine::new(MatchConfig::default());
    let recommendations = engine.recommend(&record, &catalog.list());
    render_recommendations(&recommendations, imported);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        applicant,
        today,
        course_start,
        catalog,
        skip_recommendations,
    } = args;

    let applicant = UserId(applicant);
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let course_start = course_start.unwrap_or_else(|| today + chrono::Duration::days(150));
    let saved_at = today.and_time(NaiveTime::MIN).and_utc();

    println!("Education loan intake demo (synthetic applicant data)");
    println!(
        "Applicant {} | evaluated {} | course starts {}",
        applicant.0, today, course_start
    );

    let store = Arc::new(InMemoryRecordStore::default());
    let blobs = InMemoryBlobStore::default();
    let service = Arc::new(IntakeService::new(
        store.clone(),
        Arc::new(LabelledTextExtractor),
    ));

    let mobile = demo_mobile_verification();
    println!(
        "\n- Mobile verified: {} {}",
        mobile.dial_code.as_deref().unwrap_or(""),
        mobile.number.as_deref().unwrap_or("")
    );
    if let Err(err) = service.begin(&applicant, mobile) {
        println!("  Mobile verification rejected: {err}");
        return Ok(());
    }

    let upload = BlobUpload {
        file_name: "offer_letter.txt".to_string(),
        content_type: mime_guess::from_path("offer_letter.txt")
            .first_or_octet_stream()
            .to_string(),
        bytes: OFFER_LETTER_TEXT.as_bytes().to_vec(),
    };
    let stored = match blobs.upload(&applicant, upload) {
        Ok(stored) => stored,
        Err(err) => {
            println!("  Offer letter upload failed: {err}");
            return Ok(());
        }
    };
    println!("- Offer letter stored as {}", stored.reference);

    let document = service.extract_document(
        DocumentKind::OfferLetter,
        &DocumentContent::Text(OFFER_LETTER_TEXT.to_string()),
    );
    println!("- Offer letter extraction: {}", document.status.label());
    let extracted_admission = match document.fields {
        ExtractedFields::Admission(admission) => Some(admission),
        _ => None,
    };

    let submissions = vec![
        SectionSubmission::Admission {
            extracted: extracted_admission,
            edits: demo_admission_edits(course_start, stored.reference.clone()),
        },
        SectionSubmission::Personal {
            extracted: None,
            edits: demo_personal_details(today),
        },
        SectionSubmission::Academic {
            edits: demo_academic_details(today),
        },
        SectionSubmission::CoSignatory {
            extracted: None,
            edits: demo_co_signatory_answer(),
        },
        SectionSubmission::WorkEmployment {
            extracted: None,
            edits: demo_work_details(),
        },
    ];

    println!("\nSection saves");
    for submission in submissions {
        let outcome = match service.save_section(&applicant, submission, saved_at) {
            Ok(outcome) => outcome,
            Err(err) => {
                println!("  Save rejected: {err}");
                return Ok(());
            }
        };
        println!(
            "- {}: complete = {}",
            outcome.section.label(),
            outcome.section_complete
        );
    }

    match service.record_consent(&applicant, SectionKind::ProfessionalKyc, saved_at) {
        Ok(_) => println!("- Professional review confirmed"),
        Err(err) => {
            println!("  Consent rejected: {err}");
            return Ok(());
        }
    }

    let advance = match service.advance(
        &applicant,
        ApplicationType::Loan,
        WizardStep::ReviewProfessionalKyc,
        today,
    ) {
        Ok(advance) => advance,
        Err(err) => {
            println!("  Advance unavailable: {err}");
            return Ok(());
        }
    };
    println!(
        "- Saving on {} routes to {}",
        advance.from.label(),
        advance.to.label()
    );

    let progress = match service.progress(
        &applicant,
        ApplicationType::Loan,
        WizardStep::ReviewProfessionalKyc,
        today,
    ) {
        Ok(progress) => progress,
        Err(err) => {
            println!("  Progress unavailable: {err}");
            return Ok(());
        }
    };
    println!("\nWizard progress ({})", progress.application_type_label);
    for step in &progress.steps {
        println!("- {}: {}", step.label, step.state_label);
    }
    if !progress.academic_sub_steps.is_empty() {
        println!("Academic sub-steps");
        for sub_step in &progress.academic_sub_steps {
            println!("- {}: {}", sub_step.label, sub_step.state_label);
        }
    }

    if !skip_recommendations {
        println!("\nLender recommendations");
        let (catalog, imported) = load_catalog_from_path(catalog)?;
        let record = match service.record(&applicant) {
            Ok(record) => record,
            Err(err) => {
                println!("  Record unavailable: {err}");
                return Ok(());
            }
        };
        let engine = RecommendationEngine::new(MatchConfig::default());
        let recommendations = engine.recommend(&record, &catalog.list());
        render_recommendations(&recommendations, imported);

        if let Some(first) = recommendations.domestic.first() {
            let selection = SectionSubmission::Recommendations {
                selected_lender_names: vec![first.lender.name.clone()],
            };
            match service.save_section(&applicant, selection, saved_at) {
                Ok(outcome) => println!(
                    "\n- Applicant selected {} (section complete = {})",
                    first.lender.name, outcome.section_complete
                ),
                Err(err) => {
                    println!("  Selection rejected: {err}");
                    return Ok(());
                }
            }
        }
    }

    let stored_record = match store.fetch(&applicant) {
        Ok(Some(record)) => record,
        Ok(None) => {
            println!("  Record store lookup returned no record");
            return Ok(());
        }
        Err(err) => {
            println!("  Record store unavailable: {err}");
            return Ok(());
        }
    };
    match serde_json::to_string_pretty(&stored_record) {
        Ok(json) => println!("\nCanonical record\n{json}"),
        Err(err) => println!("  Canonical record unavailable: {err}"),
    }

    let uploads = blobs.stored();
    if uploads.is_empty() {
        println!("\nUploaded documents: none");
    } else {
        println!("\nUploaded documents");
        for (owner, upload) in uploads {
            println!(
                "- {} ({}, {} bytes) for {}",
                upload.file_name,
                upload.content_type,
                upload.bytes.len(),
                owner.0
            );
        }
    }

    Ok(())
}

pub(crate) fn load_catalog_from_path(
    path: Option<PathBuf>,
) -> Result<(StaticLenderCatalog, bool), AppError> {
    match path {
        Some(path) => StaticLenderCatalog::from_path(&path)
            .map(|catalog| (catalog, true))
            .map_err(AppError::from),
        None => Ok((built_in_lender_catalog(), false)),
    }
}

pub(crate) fn render_recommendations(recommendations: &LenderRecommendations, imported: bool) {
    if imported {
        println!("Catalog source: CSV import");
    } else {
        println!("Catalog source: built-in defaults");
    }
    match recommendations.home_country.as_deref() {
        Some(country) => println!("Applicant home country: {country}"),
        None => println!("Applicant home country: not established"),
    }
    println!(
        "Estimated loan amount: {}",
        recommendations.estimated_loan_amount
    );

    if recommendations.domestic.is_empty() {
        println!("\nDomestic lenders: none");
    } else {
        println!("\nDomestic lenders");
        for annotated in &recommendations.domestic {
            render_lender(annotated);
        }
    }

    if recommendations.foreign.is_empty() {
        println!("\nForeign lenders: none");
    } else {
        println!("\nForeign lenders");
        for annotated in &recommendations.foreign {
            render_lender(annotated);
        }
    }
}

fn render_lender(annotated: &AnnotatedLender) {
    let currency = annotated
        .lender
        .loan_currency
        .as_deref()
        .unwrap_or("currency unlisted");
    let rate = annotated
        .lender
        .interest_rate
        .as_deref()
        .unwrap_or("rate on request");
    println!(
        "- {} | {} | {} | estimate {}",
        annotated.lender.name, currency, rate, annotated.estimated_loan_amount
    );
}

const OFFER_LETTER_TEXT: &str = "Student Name: Asha Rao\n\
University: Technical University of Munich\n\
Course: MSc Robotics\n\
Level: Postgraduate\n\
Fees: EUR 12,500 per year\n\
Currency: EUR\n\
Offer Type: conditional\n";

fn demo_mobile_verification() -> MobileVerification {
    MobileVerification {
        number: Some("9876504321".to_string()),
        dial_code: Some("+91".to_string()),
        country_short_name: Some("IN".to_string()),
        verified: true,
    }
}

fn demo_admission_edits(course_start: NaiveDate, offer_letter_doc_ref: String) -> AdmissionKyc {
    AdmissionKyc {
        has_offer_letter: Some(true),
        course_start_date: Some(course_start),
        offer_letter_doc_ref: Some(offer_letter_doc_ref),
        ..AdmissionKyc::default()
    }
}

fn demo_personal_details(today: NaiveDate) -> PersonalKyc {
    PersonalKyc {
        id_document_type: Some(IdDocumentType::Pan),
        id_number: Some("BQZPR6741K".to_string()),
        date_of_birth: Some(today - chrono::Duration::days(365 * 24)),
        country_of_user: Some("India".to_string()),
        permanent_address: Some("14 Lakeview Road, Pune".to_string()),
        ..PersonalKyc::default()
    }
}

fn demo_academic_details(today: NaiveDate) -> AcademicKyc {
    AcademicKyc {
        graduation: EducationRecord {
            level: Some(EducationLevel::Degree),
            percentage: Some(71.5),
            completed_on: MonthYear {
                month: Some(6),
                year: Some(today.year() - 3),
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
            meets_threshold: Some(true),
            test_date: Some(today - chrono::Duration::days(90)),
            ..LanguageTest::default()
        },
        course_test: CourseTest {
            given: Some(TestGiven::No),
            ..CourseTest::default()
        },
    }
}

fn demo_co_signatory_answer() -> CoSignatory {
    CoSignatory {
        choice: Some(CoSignatoryChoice::AddLater),
        ..CoSignatory::default()
    }
}

fn demo_work_details() -> WorkEmployment {
    WorkEmployment {
        industry: Some("Software Engineering".to_string()),
        years_experience: Some(3),
        months_experience: Some(4),
        proof_type: Some(EmploymentProofType::Resume),
        currently_working: Some(true),
        monthly_salary: Some(95_000.0),
        currency: Some("INR".to_string()),
        ..WorkEmployment::default()
    }
}
