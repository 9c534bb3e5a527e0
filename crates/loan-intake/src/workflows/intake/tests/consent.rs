use super::common::*;

use chrono::{Duration, Utc};

use crate::workflows::intake::consent::{record_section_consent, ConsentError};
use crate::workflows::intake::domain::{CanonicalRecord, ProfessionalKyc, SectionKind};
use crate::workflows::intake::routing::{ApplicationType, StepContext};

#[test]
fn consent_is_refused_for_an_incomplete_section() {
    let record = CanonicalRecord::new(user());
    let ctx = StepContext::new(ApplicationType::Loan, today()).academic(&record);

    let refused = record_section_consent(&record, SectionKind::ProfessionalKyc, Utc::now(), &ctx);
    assert_eq!(
        refused,
        Err(ConsentError::SectionIncomplete {
            section: SectionKind::ProfessionalKyc
        })
    );
}

#[test]
fn consent_stores_the_caller_timestamp_verbatim() {
    let record = loan_record_before_review();
    let ctx = StepContext::new(ApplicationType::Loan, today()).academic(&record);
    let at = edited_at();

    let granted = record_section_consent(&record, SectionKind::ProfessionalKyc, at, &ctx)
        .expect("complete section accepts consent");
    assert_eq!(granted, (SectionKind::ProfessionalKyc, at));
}

#[test]
fn reconfirming_refreshes_the_stored_timestamp() {
    let mut record = loan_record_before_review();
    let ctx = StepContext::new(ApplicationType::Loan, today()).academic(&record);

    let first = edited_at();
    let (section, at) = record_section_consent(&record, SectionKind::ProfessionalKyc, first, &ctx)
        .expect("first confirmation");
    record.consent_timestamps.insert(section, at);

    let later = first + Duration::hours(2);
    let (section, at) = record_section_consent(&record, SectionKind::ProfessionalKyc, later, &ctx)
        .expect("second confirmation");
    record.consent_timestamps.insert(section, at);

    assert_eq!(
        record.consent_timestamps.get(&SectionKind::ProfessionalKyc),
        Some(&later)
    );
    assert_eq!(record.consent_timestamps.len(), 1);
}

#[test]
fn professional_consent_needs_both_sub_objects() {
    let mut record = loan_record_before_review();
    record.professional_kyc = Some(ProfessionalKyc {
        co_signatory: Some(co_signatory_complete()),
        work_employment: None,
    });
    let ctx = StepContext::new(ApplicationType::Loan, today()).academic(&record);

    let refused = record_section_consent(&record, SectionKind::ProfessionalKyc, Utc::now(), &ctx);
    assert!(refused.is_err());
}

#[test]
fn other_sections_can_be_confirmed_too() {
    let record = loan_record_before_review();
    let ctx = StepContext::new(ApplicationType::Loan, today()).academic(&record);

    assert!(record_section_consent(&record, SectionKind::AdmissionKyc, Utc::now(), &ctx).is_ok());
    assert!(record_section_consent(&record, SectionKind::AcademicKyc, Utc::now(), &ctx).is_ok());
    assert!(record_section_consent(&record, SectionKind::Preferences, Utc::now(), &ctx).is_err());
}
