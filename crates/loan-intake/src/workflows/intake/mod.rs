//! Guided loan-application intake: one canonical record per applicant,
//! reconciled section saves, deterministic step routing and progress
//! reporting.
//!
//! The pure pieces (reconciliation, routing, completeness, consent) take
//! every input as an argument, including dates; the service layer owns
//! fetch/persist orchestration and the router exposes it all over HTTP.

pub mod academic;
pub(crate) mod consent;
pub mod domain;
pub mod extraction;
pub mod progress;
pub(crate) mod reconcile;
pub mod router;
pub(crate) mod routing;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use academic::{
    AcademicContext, AcademicKyc, CourseTest, CourseTestType, EducationLevel, EducationRecord,
    EducationSlot, LanguageTest, LanguageTestType, MonthYear, PursuingType, TestGiven,
    ENGLISH_TEST_EXEMPT_COUNTRIES, THRESHOLD_SCORING_COUNTRIES,
};
pub use consent::ConsentError;
pub use domain::{
    age_in_years, AdmissionKyc, CanonicalRecord, CoSignatory, CoSignatoryChoice, CourseLevel,
    EmploymentProofType, FieldSource, IdDocumentType, LenderSelection, MobileVerification,
    OfferLetterType, PersonalKyc, ProfessionalKyc, ProvenanceEntry, RecordPatch, SectionKind,
    StudyPreferences, UserId, WorkEmployment, NOT_SPECIFIED,
};
pub use extraction::{
    DocumentContent, DocumentExtractor, DocumentKind, ExtractedDocument, ExtractedFields,
    ExtractionStatus,
};
pub use progress::{
    academic_sub_step_states, intake_progress, AcademicSubStep, AcademicSubStepSnapshot,
    IntakeProgress, StepSnapshot,
};
pub use reconcile::{
    reconcile_academic, reconcile_admission, reconcile_co_signatory, reconcile_mobile,
    reconcile_personal, reconcile_preferences, reconcile_selection, reconcile_work_employment,
    ProvenanceUpdate, Reconciled,
};
pub use router::{intake_router, IntakeRouterState};
pub use routing::{
    next_step, resume_step, step_complete, step_state, wizard_path, ApplicationType, StepContext,
    StepState, WizardStep,
};
pub use service::{
    IntakeService, IntakeServiceError, SectionOutcome, SectionSubmission, StepAdvance,
};
pub use store::{BlobError, BlobStore, BlobUpload, RecordStore, StoreError, StoredBlob};
