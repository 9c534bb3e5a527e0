//! Read-only progress views rendered from a record plus session context.

use serde::Serialize;

use super::academic::{AcademicContext, AcademicKyc, EducationSlot};
use super::domain::CanonicalRecord;
use super::routing::{
    next_step, resume_step, step_state, ApplicationType, StepContext, StepState, WizardStep,
};

/// Sub-steps of the academic section, unlocked strictly in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AcademicSubStep {
    Graduation,
    PostGraduation,
    LanguageTest,
    CourseTest,
}

impl AcademicSubStep {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Graduation,
            Self::PostGraduation,
            Self::LanguageTest,
            Self::CourseTest,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Graduation => "Graduation",
            Self::PostGraduation => "Post Graduation",
            Self::LanguageTest => "English Language Test",
            Self::CourseTest => "Course Test",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSnapshot {
    pub step: WizardStep,
    pub label: &'static str,
    pub state: StepState,
    pub state_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicSubStepSnapshot {
    pub sub_step: AcademicSubStep,
    pub label: &'static str,
    pub state: StepState,
    pub state_label: &'static str,
}

/// Full wizard progress for one applicant: the state of every step plus
/// where a save on the current step would land.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeProgress {
    pub user_id: String,
    pub application_type: ApplicationType,
    pub application_type_label: &'static str,
    pub current_step: WizardStep,
    pub current_step_label: &'static str,
    pub next_step: WizardStep,
    pub next_step_label: &'static str,
    pub resume_step: WizardStep,
    pub steps: Vec<StepSnapshot>,
    pub academic_sub_steps: Vec<AcademicSubStepSnapshot>,
}

pub fn intake_progress(
    record: &CanonicalRecord,
    ctx: &StepContext,
    current: WizardStep,
) -> IntakeProgress {
    let destination = next_step(record, ctx, current);
    let steps = WizardStep::ordered()
        .into_iter()
        .map(|step| {
            let state = step_state(record, ctx, step);
            StepSnapshot {
                step,
                label: step.label(),
                state,
                state_label: state.label(),
            }
        })
        .collect();
    IntakeProgress {
        user_id: record.user_id.0.clone(),
        application_type: ctx.application_type,
        application_type_label: ctx.application_type.label(),
        current_step: current,
        current_step_label: current.label(),
        next_step: destination,
        next_step_label: destination.label(),
        resume_step: resume_step(record, ctx),
        steps,
        academic_sub_steps: academic_sub_step_states(record, &ctx.academic(record)),
    }
}

/// States of the four academic sub-steps. Exempt applicants see the
/// language test as skipped; each remaining sub-step unlocks only once
/// everything before it is complete or skipped.
pub fn academic_sub_step_states(
    record: &CanonicalRecord,
    ctx: &AcademicContext,
) -> Vec<AcademicSubStepSnapshot> {
    let section = record.academic_kyc.clone().unwrap_or_default();
    let mut unlocked = true;
    AcademicSubStep::ordered()
        .into_iter()
        .map(|sub_step| {
            let (complete, skipped) = sub_step_status(&section, ctx, sub_step);
            let state = if skipped {
                StepState::Skipped
            } else if complete {
                StepState::Complete
            } else if unlocked {
                StepState::Available
            } else {
                StepState::Locked
            };
            unlocked = unlocked && state.is_satisfied();
            AcademicSubStepSnapshot {
                sub_step,
                label: sub_step.label(),
                state,
                state_label: state.label(),
            }
        })
        .collect()
}

fn sub_step_status(
    section: &AcademicKyc,
    ctx: &AcademicContext,
    sub_step: AcademicSubStep,
) -> (bool, bool) {
    match sub_step {
        AcademicSubStep::Graduation => {
            (section.graduation.is_complete(EducationSlot::Graduation), false)
        }
        AcademicSubStep::PostGraduation => (
            section
                .post_graduation
                .is_complete(EducationSlot::PostGraduation),
            false,
        ),
        AcademicSubStep::LanguageTest => (
            section.language_test.is_complete(ctx),
            ctx.language_test_exempt(),
        ),
        AcademicSubStep::CourseTest => (section.course_test.is_complete(ctx.today), false),
    }
}
