//! Deterministic step routing for the intake wizard.
//!
//! `next_step` is total: every current step maps to a destination for any
//! record shape, with an incomplete step routing back to itself. All
//! decisions read the stored record plus the session context, nothing
//! else, so the router can replay the same answer for the same inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::academic::AcademicContext;
use super::domain::{CanonicalRecord, SectionKind};

/// Funding product selected before the wizard starts; decides which
/// steps are on the applicant's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationType {
    Loan,
    Study,
    Work,
}

impl ApplicationType {
    pub const fn ordered() -> [Self; 3] {
        [Self::Loan, Self::Study, Self::Work]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Loan => "Education Loan",
            Self::Study => "Study Abroad",
            Self::Work => "Work Abroad",
        }
    }
}

/// Screens of the guided wizard in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Mobile,
    AdmissionKyc,
    PersonalKyc,
    AcademicKyc,
    ProfessionalKyc,
    WorkEmploymentKyc,
    ReviewProfessionalKyc,
    Preferences,
    UniversityRecommendations,
    LenderRecommendations,
}

impl WizardStep {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::Mobile,
            Self::AdmissionKyc,
            Self::PersonalKyc,
            Self::AcademicKyc,
            Self::ProfessionalKyc,
            Self::WorkEmploymentKyc,
            Self::ReviewProfessionalKyc,
            Self::Preferences,
            Self::UniversityRecommendations,
            Self::LenderRecommendations,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Mobile => "Mobile Verification",
            Self::AdmissionKyc => "Admission KYC",
            Self::PersonalKyc => "Personal KYC",
            Self::AcademicKyc => "Academic KYC",
            Self::ProfessionalKyc => "Co-Signatory",
            Self::WorkEmploymentKyc => "Work & Employment",
            Self::ReviewProfessionalKyc => "Professional Review",
            Self::Preferences => "Study Preferences",
            Self::UniversityRecommendations => "University Recommendations",
            Self::LenderRecommendations => "Lender Recommendations",
        }
    }
}

/// Session inputs the router needs besides the stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepContext {
    pub application_type: ApplicationType,
    pub today: NaiveDate,
}

impl StepContext {
    pub fn new(application_type: ApplicationType, today: NaiveDate) -> Self {
        Self {
            application_type,
            today,
        }
    }

    pub fn academic(&self, record: &CanonicalRecord) -> AcademicContext {
        AcademicContext::for_record(record, self.today)
    }
}

/// Gate state of a wizard step for the progress rail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Locked,
    Available,
    Complete,
    Skipped,
}

impl StepState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Locked => "Locked",
            Self::Available => "Available",
            Self::Complete => "Complete",
            Self::Skipped => "Skipped",
        }
    }

    pub const fn is_satisfied(self) -> bool {
        matches!(self, Self::Complete | Self::Skipped)
    }
}

/// The ordered steps this applicant will actually visit. Admission only
/// exists on the loan track, academics on the study and loan tracks, and
/// the tail is either the preferences branch or lender recommendations.
pub fn wizard_path(record: &CanonicalRecord, ctx: &StepContext) -> Vec<WizardStep> {
    let mut path = vec![WizardStep::Mobile];
    if ctx.application_type == ApplicationType::Loan {
        path.push(WizardStep::AdmissionKyc);
    }
    path.push(WizardStep::PersonalKyc);
    if matches!(ctx.application_type, ApplicationType::Study | ApplicationType::Loan) {
        path.push(WizardStep::AcademicKyc);
    }
    path.push(WizardStep::ProfessionalKyc);
    path.push(WizardStep::WorkEmploymentKyc);
    path.push(WizardStep::ReviewProfessionalKyc);
    if takes_preferences_branch(record, ctx) {
        path.push(WizardStep::Preferences);
        path.push(WizardStep::UniversityRecommendations);
    } else {
        path.push(WizardStep::LenderRecommendations);
    }
    path
}

/// Applicants on the study or loan track who explicitly answered that no
/// offer letter exists detour through preferences and university
/// recommendations instead of lender matching.
fn takes_preferences_branch(record: &CanonicalRecord, ctx: &StepContext) -> bool {
    matches!(ctx.application_type, ApplicationType::Study | ApplicationType::Loan)
        && record.effective_offer_letter() == Some(false)
}

/// Whether the gate guarding the step's forward transition is satisfied.
pub fn step_complete(record: &CanonicalRecord, ctx: &StepContext, step: WizardStep) -> bool {
    let academic = ctx.academic(record);
    match step {
        WizardStep::Mobile => record.section_complete(SectionKind::Mobile, &academic),
        WizardStep::AdmissionKyc => record.section_complete(SectionKind::AdmissionKyc, &academic),
        WizardStep::PersonalKyc => record.section_complete(SectionKind::PersonalKyc, &academic),
        WizardStep::AcademicKyc => record.section_complete(SectionKind::AcademicKyc, &academic),
        WizardStep::ProfessionalKyc => record
            .professional_kyc
            .as_ref()
            .map(|professional| professional.co_signatory_complete())
            .unwrap_or(false),
        WizardStep::WorkEmploymentKyc => record
            .professional_kyc
            .as_ref()
            .map(|professional| professional.work_employment_complete())
            .unwrap_or(false),
        WizardStep::ReviewProfessionalKyc => record.consent_recorded(SectionKind::ProfessionalKyc),
        WizardStep::Preferences => record.section_complete(SectionKind::Preferences, &academic),
        // Handoff screen; the wizard never advances past it on its own.
        WizardStep::UniversityRecommendations => false,
        WizardStep::LenderRecommendations => {
            record.section_complete(SectionKind::Recommendations, &academic)
        }
    }
}

/// Destination after a save on `current`. An unsatisfied gate keeps the
/// applicant on the same step.
pub fn next_step(record: &CanonicalRecord, ctx: &StepContext, current: WizardStep) -> WizardStep {
    match current {
        WizardStep::Mobile => {
            if !step_complete(record, ctx, WizardStep::Mobile) {
                WizardStep::Mobile
            } else if ctx.application_type == ApplicationType::Loan {
                WizardStep::AdmissionKyc
            } else {
                WizardStep::PersonalKyc
            }
        }
        WizardStep::AdmissionKyc => {
            if step_complete(record, ctx, WizardStep::AdmissionKyc) {
                WizardStep::PersonalKyc
            } else {
                WizardStep::AdmissionKyc
            }
        }
        WizardStep::PersonalKyc => {
            if !step_complete(record, ctx, WizardStep::PersonalKyc) {
                WizardStep::PersonalKyc
            } else if ctx.application_type == ApplicationType::Work {
                WizardStep::ProfessionalKyc
            } else {
                WizardStep::AcademicKyc
            }
        }
        WizardStep::AcademicKyc => {
            if step_complete(record, ctx, WizardStep::AcademicKyc) {
                WizardStep::ProfessionalKyc
            } else {
                WizardStep::AcademicKyc
            }
        }
        WizardStep::ProfessionalKyc => {
            if step_complete(record, ctx, WizardStep::ProfessionalKyc) {
                WizardStep::WorkEmploymentKyc
            } else {
                WizardStep::ProfessionalKyc
            }
        }
        WizardStep::WorkEmploymentKyc => {
            if step_complete(record, ctx, WizardStep::WorkEmploymentKyc) {
                WizardStep::ReviewProfessionalKyc
            } else {
                WizardStep::WorkEmploymentKyc
            }
        }
        WizardStep::ReviewProfessionalKyc => {
            if !step_complete(record, ctx, WizardStep::ReviewProfessionalKyc) {
                WizardStep::ReviewProfessionalKyc
            } else if takes_preferences_branch(record, ctx) {
                WizardStep::Preferences
            } else {
                WizardStep::LenderRecommendations
            }
        }
        WizardStep::Preferences => {
            if step_complete(record, ctx, WizardStep::Preferences) {
                WizardStep::UniversityRecommendations
            } else {
                WizardStep::Preferences
            }
        }
        WizardStep::UniversityRecommendations => WizardStep::UniversityRecommendations,
        WizardStep::LenderRecommendations => WizardStep::LenderRecommendations,
    }
}

/// Gate state of any step for this applicant. Steps off the applicant's
/// path are skipped; on-path steps stay locked until every earlier
/// on-path step is satisfied.
pub fn step_state(record: &CanonicalRecord, ctx: &StepContext, step: WizardStep) -> StepState {
    let path = wizard_path(record, ctx);
    if !path.contains(&step) {
        return StepState::Skipped;
    }
    if step_complete(record, ctx, step) {
        return StepState::Complete;
    }
    for prior in path.iter().take_while(|candidate| **candidate != step) {
        if !step_complete(record, ctx, *prior) {
            return StepState::Locked;
        }
    }
    StepState::Available
}

/// The step an applicant resumes on: the first unsatisfied step of their
/// path, or the final step once everything before it is done.
pub fn resume_step(record: &CanonicalRecord, ctx: &StepContext) -> WizardStep {
    let path = wizard_path(record, ctx);
    for step in &path {
        if !step_complete(record, ctx, *step) {
            return *step;
        }
    }
    *path.last().unwrap_or(&WizardStep::Mobile)
}
