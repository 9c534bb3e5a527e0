use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use super::academic::{AcademicContext, AcademicKyc};
use super::consent::{record_section_consent, ConsentError};
use super::domain::{
    AdmissionKyc, CanonicalRecord, CoSignatory, LenderSelection, MobileVerification, PersonalKyc,
    ProfessionalKyc, ProvenanceEntry, RecordPatch, SectionKind, StudyPreferences, UserId,
    WorkEmployment,
};
use super::extraction::{DocumentContent, DocumentExtractor, DocumentKind, ExtractedDocument};
use super::progress::{intake_progress, IntakeProgress};
use super::reconcile::{
    reconcile_academic, reconcile_admission, reconcile_co_signatory, reconcile_mobile,
    reconcile_personal, reconcile_preferences, reconcile_selection, reconcile_work_employment,
    ProvenanceUpdate,
};
use super::routing::{next_step, ApplicationType, StepContext, WizardStep};
use super::store::{RecordStore, StoreError};

#[derive(Debug, Error)]
pub enum IntakeServiceError {
    #[error("applicant record not found")]
    RecordNotFound,
    #[error(transparent)]
    Consent(#[from] ConsentError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One step's "Save & Continue" payload: which section it targets, the
/// extraction to fold in (if the step ran one) and the fields the user
/// actually changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "camelCase")]
pub enum SectionSubmission {
    Mobile(MobileVerification),
    Admission {
        extracted: Option<AdmissionKyc>,
        edits: AdmissionKyc,
    },
    Personal {
        extracted: Option<PersonalKyc>,
        edits: PersonalKyc,
    },
    Academic {
        edits: AcademicKyc,
    },
    CoSignatory {
        extracted: Option<CoSignatory>,
        edits: CoSignatory,
    },
    WorkEmployment {
        extracted: Option<WorkEmployment>,
        edits: WorkEmployment,
    },
    Preferences {
        edits: StudyPreferences,
    },
    #[serde(rename_all = "camelCase")]
    Recommendations {
        selected_lender_names: Vec<String>,
    },
}

impl SectionSubmission {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Mobile(_) => SectionKind::Mobile,
            Self::Admission { .. } => SectionKind::AdmissionKyc,
            Self::Personal { .. } => SectionKind::PersonalKyc,
            Self::Academic { .. } => SectionKind::AcademicKyc,
            Self::CoSignatory { .. } | Self::WorkEmployment { .. } => SectionKind::ProfessionalKyc,
            Self::Preferences { .. } => SectionKind::Preferences,
            Self::Recommendations { .. } => SectionKind::Recommendations,
        }
    }
}

/// Result of a section save: the merged record and whether the saved
/// section now satisfies its completeness rule.
#[derive(Debug, Clone)]
pub struct SectionOutcome {
    pub section: SectionKind,
    pub section_complete: bool,
    pub record: CanonicalRecord,
}

/// Routing answer for one advance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepAdvance {
    pub from: WizardStep,
    pub to: WizardStep,
    pub moved: bool,
}

/// Orchestrates the wizard flow over a record store and a document
/// extractor. All reconciliation and routing logic lives in the pure
/// modules; this layer fetches, delegates and persists.
pub struct IntakeService<S, X> {
    store: Arc<S>,
    extractor: Arc<X>,
}

impl<S, X> IntakeService<S, X>
where
    S: RecordStore,
    X: DocumentExtractor,
{
    pub fn new(store: Arc<S>, extractor: Arc<X>) -> Self {
        Self { store, extractor }
    }

    /// Open (or refresh) a record from the mobile-verification step. This
    /// is the only save allowed before a record exists.
    pub fn begin(
        &self,
        user_id: &UserId,
        mobile: MobileVerification,
    ) -> Result<CanonicalRecord, IntakeServiceError> {
        let existing = self.store.fetch(user_id)?;
        let reconciled = reconcile_mobile(existing.and_then(|record| record.mobile), mobile);
        let patch = RecordPatch {
            mobile: Some(reconciled),
            ..RecordPatch::default()
        };
        let record = self.store.save(user_id, patch)?;
        info!(user_id = %record.user_id.0, "intake record opened");
        Ok(record)
    }

    pub fn record(&self, user_id: &UserId) -> Result<CanonicalRecord, IntakeServiceError> {
        self.store
            .fetch(user_id)?
            .ok_or(IntakeServiceError::RecordNotFound)
    }

    /// Run the extractor over an uploaded document. Failures degrade to a
    /// vacant payload; the wizard continues either way.
    pub fn extract_document(
        &self,
        kind: DocumentKind,
        content: &DocumentContent,
    ) -> ExtractedDocument {
        let document = self.extractor.extract(kind, content);
        if document.is_failure() {
            warn!(
                kind = kind.label(),
                "document extraction failed; continuing with vacant fields"
            );
        }
        document
    }

    /// Reconcile and persist one step's submission. Sections other than
    /// the submitted one are untouched by the resulting patch.
    pub fn save_section(
        &self,
        user_id: &UserId,
        submission: SectionSubmission,
        saved_at: DateTime<Utc>,
    ) -> Result<SectionOutcome, IntakeServiceError> {
        let existing = self.store.fetch(user_id)?;
        if existing.is_none() && !matches!(submission, SectionSubmission::Mobile(_)) {
            return Err(IntakeServiceError::RecordNotFound);
        }
        let today = saved_at.date_naive();
        let section = submission.kind();
        let patch = self.section_patch(existing.as_ref(), submission, saved_at, today);

        let record = self.store.save(user_id, patch)?;
        let ctx = AcademicContext::for_record(&record, today);
        let section_complete = record.section_complete(section, &ctx);
        info!(
            user_id = %record.user_id.0,
            section = section.key(),
            complete = section_complete,
            "intake section saved"
        );
        Ok(SectionOutcome {
            section,
            section_complete,
            record,
        })
    }

    /// Store the applicant's review confirmation for a section. The
    /// timestamp comes from the caller and is rejected while the section
    /// is incomplete.
    pub fn record_consent(
        &self,
        user_id: &UserId,
        section: SectionKind,
        at: DateTime<Utc>,
    ) -> Result<CanonicalRecord, IntakeServiceError> {
        let record = self.record(user_id)?;
        let ctx = AcademicContext::for_record(&record, at.date_naive());
        let (section, at) = record_section_consent(&record, section, at, &ctx)?;
        let mut patch = RecordPatch::default();
        patch.consent_timestamps.insert(section, at);
        let record = self.store.save(user_id, patch)?;
        info!(
            user_id = %record.user_id.0,
            section = section.key(),
            "section review confirmed"
        );
        Ok(record)
    }

    /// Where a save on `current` lands this applicant.
    pub fn advance(
        &self,
        user_id: &UserId,
        application_type: ApplicationType,
        current: WizardStep,
        today: NaiveDate,
    ) -> Result<StepAdvance, IntakeServiceError> {
        let record = self.record(user_id)?;
        let ctx = StepContext::new(application_type, today);
        let to = next_step(&record, &ctx, current);
        Ok(StepAdvance {
            from: current,
            to,
            moved: to != current,
        })
    }

    pub fn progress(
        &self,
        user_id: &UserId,
        application_type: ApplicationType,
        current: WizardStep,
        today: NaiveDate,
    ) -> Result<IntakeProgress, IntakeServiceError> {
        let record = self.record(user_id)?;
        let ctx = StepContext::new(application_type, today);
        Ok(intake_progress(&record, &ctx, current))
    }

    fn section_patch(
        &self,
        existing: Option<&CanonicalRecord>,
        submission: SectionSubmission,
        saved_at: DateTime<Utc>,
        today: NaiveDate,
    ) -> RecordPatch {
        let mut patch = RecordPatch::default();
        match submission {
            SectionSubmission::Mobile(mobile) => {
                let current = existing.and_then(|record| record.mobile.clone());
                patch.mobile = Some(reconcile_mobile(current, mobile));
            }
            SectionSubmission::Admission { extracted, edits } => {
                let current = existing.and_then(|record| record.admission_kyc.clone());
                let reconciled = reconcile_admission(current, extracted, edits, saved_at);
                patch.admission_kyc = Some(reconciled.data);
                patch.provenance = fold_provenance(reconciled.provenance);
            }
            SectionSubmission::Personal { extracted, edits } => {
                let current = existing.and_then(|record| record.personal_kyc.clone());
                let reconciled = reconcile_personal(current, extracted, edits, saved_at, today);
                patch.personal_kyc = Some(reconciled.data);
                patch.provenance = fold_provenance(reconciled.provenance);
            }
            SectionSubmission::Academic { edits } => {
                let ctx = match existing {
                    Some(record) => AcademicContext::for_record(record, today),
                    None => AcademicContext::new(None, today),
                };
                let current = existing.and_then(|record| record.academic_kyc.clone());
                let reconciled = reconcile_academic(current, edits, &ctx, saved_at);
                patch.academic_kyc = Some(reconciled.data);
                patch.provenance = fold_provenance(reconciled.provenance);
            }
            SectionSubmission::CoSignatory { extracted, edits } => {
                let professional = existing
                    .and_then(|record| record.professional_kyc.clone())
                    .unwrap_or_default();
                let reconciled =
                    reconcile_co_signatory(professional.co_signatory, extracted, edits, saved_at);
                patch.professional_kyc = Some(ProfessionalKyc {
                    co_signatory: Some(reconciled.data),
                    work_employment: professional.work_employment,
                });
                patch.provenance = fold_provenance(reconciled.provenance);
            }
            SectionSubmission::WorkEmployment { extracted, edits } => {
                let professional = existing
                    .and_then(|record| record.professional_kyc.clone())
                    .unwrap_or_default();
                let reconciled = reconcile_work_employment(
                    professional.work_employment,
                    extracted,
                    edits,
                    saved_at,
                );
                patch.professional_kyc = Some(ProfessionalKyc {
                    co_signatory: professional.co_signatory,
                    work_employment: Some(reconciled.data),
                });
                patch.provenance = fold_provenance(reconciled.provenance);
            }
            SectionSubmission::Preferences { edits } => {
                let current = existing.and_then(|record| record.preferences.clone());
                let reconciled = reconcile_preferences(current, edits, saved_at);
                patch.preferences = Some(reconciled.data);
                patch.provenance = fold_provenance(reconciled.provenance);
            }
            SectionSubmission::Recommendations {
                selected_lender_names,
            } => {
                patch.recommendations = Some(reconcile_selection(LenderSelection {
                    selected_lender_names,
                }));
            }
        }
        patch
    }
}

fn fold_provenance(updates: Vec<ProvenanceUpdate>) -> BTreeMap<String, ProvenanceEntry> {
    updates
        .into_iter()
        .map(|update| (update.path, update.entry))
        .collect()
}
