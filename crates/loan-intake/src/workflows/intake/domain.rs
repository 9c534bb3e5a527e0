use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::academic::{AcademicContext, AcademicKyc};

/// Identifier wrapper for applicant records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

/// Placeholder emitted by the document extractor (and found in legacy
/// payloads) when a value could not be produced. Normalized to `None` at
/// every ingestion point; never stored in a `CanonicalRecord`.
pub const NOT_SPECIFIED: &str = "Not Specified";

/// Collapse sentinel and blank boundary values into `None`.
pub(crate) fn normalize_field(raw: Option<String>) -> Option<String> {
    raw.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NOT_SPECIFIED) {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// True when an optional text field holds a usable (non-sentinel) value.
pub(crate) fn field_present(value: &Option<String>) -> bool {
    match value {
        Some(text) => {
            let trimmed = text.trim();
            !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(NOT_SPECIFIED)
        }
        None => false,
    }
}

/// Origin of a reconciled field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Ai,
    User,
}

impl FieldSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::User => "user",
        }
    }
}

/// Per-field provenance entry; `edited_at` is caller-supplied and only kept
/// for user edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceEntry {
    pub source: FieldSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
}

/// Named sub-objects of the canonical record, each with its own
/// completeness rule and consent slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    Mobile,
    AdmissionKyc,
    PersonalKyc,
    AcademicKyc,
    ProfessionalKyc,
    Preferences,
    Recommendations,
}

impl SectionKind {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Mobile,
            Self::AdmissionKyc,
            Self::PersonalKyc,
            Self::AcademicKyc,
            Self::ProfessionalKyc,
            Self::Preferences,
            Self::Recommendations,
        ]
    }

    /// Persisted document key; also the prefix of provenance paths.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::AdmissionKyc => "admissionKyc",
            Self::PersonalKyc => "personalKyc",
            Self::AcademicKyc => "academicKyc",
            Self::ProfessionalKyc => "professionalKyc",
            Self::Preferences => "preferences",
            Self::Recommendations => "recommendations",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Mobile => "Mobile Verification",
            Self::AdmissionKyc => "Admission KYC",
            Self::PersonalKyc => "Personal KYC",
            Self::AcademicKyc => "Academic KYC",
            Self::ProfessionalKyc => "Professional KYC",
            Self::Preferences => "Study Preferences",
            Self::Recommendations => "Lender Recommendations",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Verified-mobile snapshot captured on the first wizard step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileVerification {
    pub number: Option<String>,
    pub dial_code: Option<String>,
    pub country_short_name: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

impl MobileVerification {
    pub fn is_complete(&self) -> bool {
        self.verified && field_present(&self.number) && field_present(&self.dial_code)
    }
}

/// Kind of admission offer the applicant holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferLetterType {
    #[serde(alias = "Conditional")]
    Conditional,
    #[serde(alias = "Unconditional")]
    Unconditional,
}

/// Admission details, largely hydrated from the offer-letter extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionKyc {
    pub has_offer_letter: Option<bool>,
    pub student_name: Option<String>,
    pub university_name: Option<String>,
    pub course_name: Option<String>,
    pub admission_level: Option<String>,
    pub admission_fees: Option<String>,
    pub fees_currency: Option<String>,
    pub course_start_date: Option<NaiveDate>,
    pub offer_letter_type: Option<OfferLetterType>,
    pub offer_letter_doc_ref: Option<String>,
}

impl AdmissionKyc {
    /// A declined offer letter completes the section on its own; a held
    /// offer letter requires the extracted/confirmed details.
    pub fn is_complete(&self) -> bool {
        match self.has_offer_letter {
            None => false,
            Some(false) => true,
            Some(true) => {
                field_present(&self.student_name)
                    && field_present(&self.university_name)
                    && field_present(&self.course_name)
                    && field_present(&self.admission_level)
                    && field_present(&self.admission_fees)
                    && self.course_start_date.is_some()
                    && self.offer_letter_type.is_some()
                    && field_present(&self.offer_letter_doc_ref)
            }
        }
    }
}

/// Identity document kinds accepted during personal KYC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdDocumentType {
    #[serde(alias = "PAN", alias = "Pan")]
    Pan,
    #[serde(alias = "NationalID", alias = "nationalId")]
    NationalId,
}

/// Personal identity section; `age_in_years` is derived from the date of
/// birth and recomputed whenever an edit changes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalKyc {
    pub id_document_type: Option<IdDocumentType>,
    pub id_number: Option<String>,
    pub passport_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub age_in_years: Option<u8>,
    pub country_of_user: Option<String>,
    pub permanent_address: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub doc_refs: Vec<String>,
}

impl PersonalKyc {
    pub fn recompute_age(&mut self, today: NaiveDate) {
        self.age_in_years = self.date_of_birth.map(|dob| age_in_years(dob, today));
    }

    pub fn is_complete(&self) -> bool {
        self.id_document_type.is_some()
            && field_present(&self.id_number)
            && self.date_of_birth.is_some()
            && field_present(&self.country_of_user)
            && field_present(&self.permanent_address)
    }
}

/// Whole years between a date of birth and `today`, clamped to zero for
/// future dates.
pub fn age_in_years(date_of_birth: NaiveDate, today: NaiveDate) -> u8 {
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    years.clamp(0, u8::MAX as i32) as u8
}

/// Applicant's answer on whether a co-signatory will be provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoSignatoryChoice {
    #[serde(alias = "Yes")]
    Yes,
    #[serde(alias = "No")]
    No,
    #[serde(alias = "AddLater", alias = "addLater")]
    AddLater,
}

/// Co-signatory sub-object; the `extracted*` fields are hydrated from the
/// ID-document extraction and kept distinct from the user's answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoSignatory {
    pub choice: Option<CoSignatoryChoice>,
    pub id_doc_ref: Option<String>,
    pub relationship: Option<String>,
    pub extracted_id_number: Option<String>,
    pub extracted_name: Option<String>,
}

impl CoSignatory {
    pub fn is_complete(&self) -> bool {
        match self.choice {
            None => false,
            Some(CoSignatoryChoice::Yes) => {
                field_present(&self.relationship) && field_present(&self.id_doc_ref)
            }
            Some(CoSignatoryChoice::No) | Some(CoSignatoryChoice::AddLater) => true,
        }
    }
}

/// Accepted employment-proof document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentProofType {
    #[serde(alias = "Resume")]
    Resume,
    #[serde(alias = "LinkedIn", alias = "Linkedin")]
    Linkedin,
}

/// Work and employment sub-object; `extracted*` fields come from the
/// resume/profile extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkEmployment {
    pub industry: Option<String>,
    pub years_experience: Option<u8>,
    pub months_experience: Option<u8>,
    pub proof_type: Option<EmploymentProofType>,
    pub extracted_years: Option<String>,
    pub extracted_industry: Option<String>,
    pub currently_working: Option<bool>,
    pub monthly_salary: Option<f64>,
    pub currency: Option<String>,
}

impl WorkEmployment {
    pub fn is_complete(&self) -> bool {
        match self.currently_working {
            None => false,
            Some(false) => true,
            Some(true) => {
                field_present(&self.industry)
                    && self.years_experience.is_some()
                    && self.monthly_salary.is_some()
                    && field_present(&self.currency)
            }
        }
    }
}

/// Professional section grouping the co-signatory and employment
/// sub-objects reviewed together on the professional review screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalKyc {
    pub co_signatory: Option<CoSignatory>,
    pub work_employment: Option<WorkEmployment>,
}

impl ProfessionalKyc {
    pub fn co_signatory_complete(&self) -> bool {
        self.co_signatory
            .as_ref()
            .map(CoSignatory::is_complete)
            .unwrap_or(false)
    }

    pub fn work_employment_complete(&self) -> bool {
        self.work_employment
            .as_ref()
            .map(WorkEmployment::is_complete)
            .unwrap_or(false)
    }

    pub fn is_complete(&self) -> bool {
        self.co_signatory_complete() && self.work_employment_complete()
    }
}

/// Course levels offered by the study-preferences step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseLevel {
    #[serde(alias = "Undergraduate", alias = "UG")]
    Undergraduate,
    #[serde(alias = "Postgraduate", alias = "PG")]
    Postgraduate,
    #[serde(alias = "Doctorate", alias = "PhD")]
    Doctorate,
    #[serde(alias = "Diploma")]
    Diploma,
}

/// Destination preferences for applicants without an admission offer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPreferences {
    pub country1: Option<String>,
    pub country2: Option<String>,
    pub course_level: Option<CourseLevel>,
    pub course_name: Option<String>,
}

impl StudyPreferences {
    pub fn is_complete(&self) -> bool {
        field_present(&self.country1)
            && self.course_level.is_some()
            && field_present(&self.course_name)
    }
}

/// Final lender selection submitted from the recommendations step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LenderSelection {
    #[serde(default)]
    pub selected_lender_names: Vec<String>,
}

impl LenderSelection {
    pub fn is_complete(&self) -> bool {
        self.selected_lender_names
            .iter()
            .any(|name| !name.trim().is_empty())
    }
}

/// The single merged representation of one applicant across all wizard
/// steps. Sections stay `None` until their step first saves; persisted
/// field names and nesting are fixed (consumed downstream by the review
/// and recommendation steps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<MobileVerification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_kyc: Option<AdmissionKyc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_kyc: Option<PersonalKyc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub academic_kyc: Option<AcademicKyc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_kyc: Option<ProfessionalKyc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<StudyPreferences>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<LenderSelection>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub provenance: BTreeMap<String, ProvenanceEntry>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub consent_timestamps: BTreeMap<SectionKind, DateTime<Utc>>,
}

impl CanonicalRecord {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            mobile: None,
            admission_kyc: None,
            personal_kyc: None,
            academic_kyc: None,
            professional_kyc: None,
            preferences: None,
            recommendations: None,
            provenance: BTreeMap::new(),
            consent_timestamps: BTreeMap::new(),
        }
    }

    /// Merge-semantics update: sections present in the patch replace their
    /// counterpart wholesale, everything else is left untouched, and the
    /// provenance/consent maps union (patch entries win on key collision).
    pub fn merged(mut self, patch: RecordPatch) -> Self {
        if let Some(mobile) = patch.mobile {
            self.mobile = Some(mobile);
        }
        if let Some(admission) = patch.admission_kyc {
            self.admission_kyc = Some(admission);
        }
        if let Some(personal) = patch.personal_kyc {
            self.personal_kyc = Some(personal);
        }
        if let Some(academic) = patch.academic_kyc {
            self.academic_kyc = Some(academic);
        }
        if let Some(professional) = patch.professional_kyc {
            self.professional_kyc = Some(professional);
        }
        if let Some(preferences) = patch.preferences {
            self.preferences = Some(preferences);
        }
        if let Some(recommendations) = patch.recommendations {
            self.recommendations = Some(recommendations);
        }
        self.provenance.extend(patch.provenance);
        self.consent_timestamps.extend(patch.consent_timestamps);
        self
    }

    /// Completeness of a named section. Missing sections are incomplete;
    /// academic completeness depends on the country/date context.
    pub fn section_complete(&self, kind: SectionKind, ctx: &AcademicContext) -> bool {
        match kind {
            SectionKind::Mobile => self
                .mobile
                .as_ref()
                .map(MobileVerification::is_complete)
                .unwrap_or(false),
            SectionKind::AdmissionKyc => self
                .admission_kyc
                .as_ref()
                .map(AdmissionKyc::is_complete)
                .unwrap_or(false),
            SectionKind::PersonalKyc => self
                .personal_kyc
                .as_ref()
                .map(PersonalKyc::is_complete)
                .unwrap_or(false),
            SectionKind::AcademicKyc => self
                .academic_kyc
                .as_ref()
                .map(|academic| academic.is_complete(ctx))
                .unwrap_or(false),
            SectionKind::ProfessionalKyc => self
                .professional_kyc
                .as_ref()
                .map(ProfessionalKyc::is_complete)
                .unwrap_or(false),
            SectionKind::Preferences => self
                .preferences
                .as_ref()
                .map(StudyPreferences::is_complete)
                .unwrap_or(false),
            SectionKind::Recommendations => self
                .recommendations
                .as_ref()
                .map(LenderSelection::is_complete)
                .unwrap_or(false),
        }
    }

    pub fn consent_recorded(&self, kind: SectionKind) -> bool {
        self.consent_timestamps.contains_key(&kind)
    }

    /// ISO country short name driving locale rules: the verified mobile
    /// wins, the personal section is the fallback.
    pub fn country_code(&self) -> Option<&str> {
        let from_mobile = self
            .mobile
            .as_ref()
            .and_then(|mobile| mobile.country_short_name.as_deref())
            .map(str::trim)
            .filter(|code| !code.is_empty());
        from_mobile.or_else(|| {
            self.personal_kyc
                .as_ref()
                .and_then(|personal| personal.country_of_user.as_deref())
                .map(str::trim)
                .filter(|code| !code.is_empty())
        })
    }

    pub fn effective_offer_letter(&self) -> Option<bool> {
        self.admission_kyc
            .as_ref()
            .and_then(|admission| admission.has_offer_letter)
    }
}

/// Partial record written back to the store after a step's explicit
/// "Save & Continue"; mirrors `CanonicalRecord` with every part optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordPatch {
    pub mobile: Option<MobileVerification>,
    pub admission_kyc: Option<AdmissionKyc>,
    pub personal_kyc: Option<PersonalKyc>,
    pub academic_kyc: Option<AcademicKyc>,
    pub professional_kyc: Option<ProfessionalKyc>,
    pub preferences: Option<StudyPreferences>,
    pub recommendations: Option<LenderSelection>,
    pub provenance: BTreeMap<String, ProvenanceEntry>,
    pub consent_timestamps: BTreeMap<SectionKind, DateTime<Utc>>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.mobile.is_none()
            && self.admission_kyc.is_none()
            && self.personal_kyc.is_none()
            && self.academic_kyc.is_none()
            && self.professional_kyc.is_none()
            && self.preferences.is_none()
            && self.recommendations.is_none()
            && self.provenance.is_empty()
            && self.consent_timestamps.is_empty()
    }
}
