use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{field_present, CanonicalRecord};

/// Country short names whose applicants skip the English language test
/// entirely.
pub const ENGLISH_TEST_EXEMPT_COUNTRIES: &[&str] = &["US", "GB", "CA", "AU", "NZ", "IE"];

/// Country short names where IELTS/PTE results are captured as a
/// pass-threshold answer instead of a numeric score.
pub const THRESHOLD_SCORING_COUNTRIES: &[&str] = &["IN", "PK", "BD", "NP", "LK"];

/// Locale and date inputs the academic rules depend on; always supplied by
/// the caller so the checks stay deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcademicContext {
    pub country_code: Option<String>,
    pub today: NaiveDate,
}

impl AcademicContext {
    pub fn new(country_code: Option<String>, today: NaiveDate) -> Self {
        Self { country_code, today }
    }

    pub fn for_record(record: &CanonicalRecord, today: NaiveDate) -> Self {
        Self::new(record.country_code().map(str::to_string), today)
    }

    fn code_in(&self, table: &[&str]) -> bool {
        match self.country_code.as_deref() {
            Some(code) => table.iter().any(|entry| entry.eq_ignore_ascii_case(code.trim())),
            None => false,
        }
    }

    pub fn language_test_exempt(&self) -> bool {
        self.code_in(ENGLISH_TEST_EXEMPT_COUNTRIES)
    }

    pub fn threshold_scoring(&self) -> bool {
        self.code_in(THRESHOLD_SCORING_COUNTRIES)
    }
}

/// Month/year pair captured by the completion pickers. Counts as resolved
/// only when both parts name a single calendar date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthYear {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl MonthYear {
    pub fn is_empty(&self) -> bool {
        self.month.is_none() && self.year.is_none()
    }

    pub fn resolved(&self) -> Option<NaiveDate> {
        match (self.month, self.year) {
            (Some(month), Some(year)) => NaiveDate::from_ymd_opt(year, month, 1),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved().is_some()
    }
}

/// Discriminator for the graduation and post-graduation sub-records; the
/// selected level decides which companion fields are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    #[serde(alias = "Degree")]
    Degree,
    #[serde(alias = "Diploma")]
    Diploma,
    #[serde(alias = "Pursuing")]
    Pursuing,
    #[serde(alias = "InSeniorSecondarySchool", alias = "inSeniorSecondarySchool")]
    InSeniorSecondarySchool,
    #[serde(alias = "NotApplicable", alias = "notApplicable")]
    NotApplicable,
}

impl EducationLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Degree => "Degree",
            Self::Diploma => "Diploma",
            Self::Pursuing => "Pursuing",
            Self::InSeniorSecondarySchool => "In Senior Secondary School",
            Self::NotApplicable => "Not Applicable",
        }
    }
}

/// Sub-type of a course still being pursued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PursuingType {
    #[serde(alias = "Degree")]
    Degree,
    #[serde(alias = "Diploma")]
    Diploma,
}

/// Which education slot a record fills; senior-secondary only makes sense
/// for graduation, not-applicable only for post-graduation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EducationSlot {
    Graduation,
    PostGraduation,
}

/// One education history entry (graduation or post-graduation).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationRecord {
    pub level: Option<EducationLevel>,
    pub percentage: Option<f32>,
    #[serde(default)]
    pub completed_on: MonthYear,
    pub pursuing_course: Option<String>,
    pub pursuing_type: Option<PursuingType>,
    #[serde(default)]
    pub expected_completion: MonthYear,
    pub justification: Option<String>,
}

impl EducationRecord {
    pub fn is_started(&self) -> bool {
        self.level.is_some()
    }

    pub fn is_complete(&self, slot: EducationSlot) -> bool {
        match self.level {
            None => false,
            Some(EducationLevel::Degree) | Some(EducationLevel::Diploma) => {
                percentage_valid(self.percentage) && self.completed_on.is_resolved()
            }
            Some(EducationLevel::Pursuing) => {
                field_present(&self.pursuing_course)
                    && self.pursuing_type.is_some()
                    && self.expected_completion.is_resolved()
            }
            Some(EducationLevel::InSeniorSecondarySchool) => {
                slot == EducationSlot::Graduation && field_present(&self.justification)
            }
            Some(EducationLevel::NotApplicable) => slot == EducationSlot::PostGraduation,
        }
    }
}

/// Percentages are captured on a 0..=100 scale in 0.1 steps.
pub fn percentage_valid(percentage: Option<f32>) -> bool {
    match percentage {
        Some(value) => {
            (0.0..=100.0).contains(&value) && ((value * 10.0).round() - value * 10.0).abs() < 1e-3
        }
        None => false,
    }
}

/// Answer to the "have you taken this test" gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestGiven {
    #[serde(alias = "Yes")]
    Yes,
    #[serde(alias = "No")]
    No,
    #[serde(alias = "YetToAppear", alias = "yetToAppear")]
    YetToAppear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageTestType {
    #[serde(alias = "IELTS")]
    Ielts,
    #[serde(alias = "TOEFL")]
    Toefl,
    #[serde(alias = "PTE")]
    Pte,
    #[serde(alias = "Duolingo", alias = "DuoLingo")]
    Duolingo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseTestType {
    #[serde(alias = "GRE")]
    Gre,
    #[serde(alias = "GMAT")]
    Gmat,
    #[serde(alias = "SAT")]
    Sat,
    #[serde(alias = "ACT")]
    Act,
}

/// English language proficiency test answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageTest {
    pub given: Option<TestGiven>,
    pub test_type: Option<LanguageTestType>,
    pub score: Option<String>,
    pub meets_threshold: Option<bool>,
    pub test_date: Option<NaiveDate>,
}

impl LanguageTest {
    pub fn is_started(&self) -> bool {
        self.given.is_some()
    }

    /// Exempt countries skip the test wholesale. Otherwise a taken test
    /// needs its type, date and result; IELTS/PTE results in threshold
    /// countries are a pass answer rather than a score.
    pub fn is_complete(&self, ctx: &AcademicContext) -> bool {
        if ctx.language_test_exempt() {
            return true;
        }
        match self.given {
            None => false,
            Some(TestGiven::No) => true,
            Some(TestGiven::YetToAppear) => self
                .test_date
                .map(|date| date > ctx.today)
                .unwrap_or(false),
            Some(TestGiven::Yes) => {
                let test_type = match self.test_type {
                    Some(test_type) => test_type,
                    None => return false,
                };
                if self.test_date.is_none() {
                    return false;
                }
                let threshold_result = ctx.threshold_scoring()
                    && matches!(test_type, LanguageTestType::Ielts | LanguageTestType::Pte);
                if threshold_result {
                    self.meets_threshold.is_some()
                } else {
                    field_present(&self.score)
                }
            }
        }
    }
}

/// Standardized course test answers (GRE/GMAT/SAT/ACT).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseTest {
    pub given: Option<TestGiven>,
    pub test_type: Option<CourseTestType>,
    pub score: Option<String>,
    pub test_date: Option<NaiveDate>,
}

impl CourseTest {
    pub fn is_started(&self) -> bool {
        self.given.is_some()
    }

    pub fn is_complete(&self, today: NaiveDate) -> bool {
        match self.given {
            None => false,
            Some(TestGiven::No) => true,
            Some(TestGiven::YetToAppear) => {
                self.test_date.map(|date| date > today).unwrap_or(false)
            }
            Some(TestGiven::Yes) => {
                self.test_type.is_some() && field_present(&self.score) && self.test_date.is_some()
            }
        }
    }
}

/// Academic history section: two education slots plus the two tests,
/// unlocked in order on the academic step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicKyc {
    #[serde(default)]
    pub graduation: EducationRecord,
    #[serde(default)]
    pub post_graduation: EducationRecord,
    #[serde(default)]
    pub language_test: LanguageTest,
    #[serde(default)]
    pub course_test: CourseTest,
}

impl AcademicKyc {
    /// Pre-answer the language gate for exempt countries so the section
    /// can complete without the applicant visiting that sub-step.
    pub fn apply_language_exemption(&mut self, ctx: &AcademicContext) {
        if ctx.language_test_exempt() && self.language_test.given.is_none() {
            self.language_test.given = Some(TestGiven::No);
        }
    }

    pub fn is_complete(&self, ctx: &AcademicContext) -> bool {
        self.graduation.is_complete(EducationSlot::Graduation)
            && self.post_graduation.is_complete(EducationSlot::PostGraduation)
            && self.language_test.is_complete(ctx)
            && self.course_test.is_complete(ctx.today)
    }
}
