//! Pure reconciliation of step submissions into canonical section data.
//!
//! Every step save runs through one of these functions with the same
//! contract: existing stored data, the optional document extraction, and
//! the fields the user actually changed on the form. Precedence is user
//! edit over extraction over stored value, a source only wins a field it
//! actually filled in, and sentinel or blank values are dropped before
//! they can overwrite anything. The functions take every timestamp as an
//! argument and never touch a clock, so identical inputs always produce
//! identical outputs.

use chrono::{DateTime, NaiveDate, Utc};

use super::academic::{AcademicContext, AcademicKyc, CourseTest, EducationRecord, LanguageTest, MonthYear};
use super::domain::{
    normalize_field, AdmissionKyc, CoSignatory, FieldSource, LenderSelection, MobileVerification,
    PersonalKyc, ProvenanceEntry, SectionKind, StudyPreferences, WorkEmployment,
};

/// One provenance map entry produced by a reconcile pass, keyed by the
/// dotted field path (for example `personalKyc.idNumber`).
#[derive(Debug, Clone, PartialEq)]
pub struct ProvenanceUpdate {
    pub path: String,
    pub entry: ProvenanceEntry,
}

/// Reconciled section data together with the provenance entries to merge
/// into the record.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<T> {
    pub data: T,
    pub provenance: Vec<ProvenanceUpdate>,
}

/// Field-level three-way merge with provenance bookkeeping.
struct Merge {
    prefix: &'static str,
    edited_at: DateTime<Utc>,
    updates: Vec<ProvenanceUpdate>,
}

impl Merge {
    fn new(prefix: &'static str, edited_at: DateTime<Utc>) -> Self {
        Self {
            prefix,
            edited_at,
            updates: Vec::new(),
        }
    }

    /// Apply the source precedence for one field. A user edit wins and is
    /// stamped with the caller-supplied edit time; otherwise a present
    /// extracted value wins and is marked as machine-sourced; otherwise
    /// the stored value stands untouched.
    fn pick<T>(&mut self, field: &str, existing: Option<T>, extracted: Option<T>, user: Option<T>) -> Option<T> {
        if let Some(value) = user {
            self.mark(field, FieldSource::User);
            return Some(value);
        }
        if let Some(value) = extracted {
            self.mark(field, FieldSource::Ai);
            return Some(value);
        }
        existing
    }

    fn mark(&mut self, field: &str, source: FieldSource) {
        let edited_at = match source {
            FieldSource::User => Some(self.edited_at),
            FieldSource::Ai => None,
        };
        self.updates.push(ProvenanceUpdate {
            path: format!("{}.{}", self.prefix, field),
            entry: ProvenanceEntry { source, edited_at },
        });
    }

    fn keep_only(&mut self, field: &str) {
        let path = format!("{}.{}", self.prefix, field);
        self.updates.retain(|update| update.path == path);
    }

    fn into_updates(self) -> Vec<ProvenanceUpdate> {
        self.updates
    }
}

/// The mobile step replaces its snapshot wholesale; blank parts fall back
/// to whatever was stored before. No provenance is kept for this section.
pub fn reconcile_mobile(
    existing: Option<MobileVerification>,
    submitted: MobileVerification,
) -> MobileVerification {
    let existing = existing.unwrap_or_default();
    MobileVerification {
        number: normalize_field(submitted.number).or(existing.number),
        dial_code: normalize_field(submitted.dial_code).or(existing.dial_code),
        country_short_name: normalize_field(submitted.country_short_name)
            .or(existing.country_short_name),
        verified: submitted.verified,
    }
}

pub fn reconcile_admission(
    existing: Option<AdmissionKyc>,
    extracted: Option<AdmissionKyc>,
    edits: AdmissionKyc,
    edited_at: DateTime<Utc>,
) -> Reconciled<AdmissionKyc> {
    let existing = sanitize_admission(existing.unwrap_or_default());
    let extracted = sanitize_admission(extracted.unwrap_or_default());
    let edits = sanitize_admission(edits);

    let mut merge = Merge::new(SectionKind::AdmissionKyc.key(), edited_at);
    let section = AdmissionKyc {
        has_offer_letter: merge.pick(
            "hasOfferLetter",
            existing.has_offer_letter,
            extracted.has_offer_letter,
            edits.has_offer_letter,
        ),
        student_name: merge.pick(
            "studentName",
            existing.student_name,
            extracted.student_name,
            edits.student_name,
        ),
        university_name: merge.pick(
            "universityName",
            existing.university_name,
            extracted.university_name,
            edits.university_name,
        ),
        course_name: merge.pick(
            "courseName",
            existing.course_name,
            extracted.course_name,
            edits.course_name,
        ),
        admission_level: merge.pick(
            "admissionLevel",
            existing.admission_level,
            extracted.admission_level,
            edits.admission_level,
        ),
        admission_fees: merge.pick(
            "admissionFees",
            existing.admission_fees,
            extracted.admission_fees,
            edits.admission_fees,
        ),
        fees_currency: merge.pick(
            "feesCurrency",
            existing.fees_currency,
            extracted.fees_currency,
            edits.fees_currency,
        ),
        course_start_date: merge.pick(
            "courseStartDate",
            existing.course_start_date,
            extracted.course_start_date,
            edits.course_start_date,
        ),
        offer_letter_type: merge.pick(
            "offerLetterType",
            existing.offer_letter_type,
            extracted.offer_letter_type,
            edits.offer_letter_type,
        ),
        offer_letter_doc_ref: merge.pick(
            "offerLetterDocRef",
            existing.offer_letter_doc_ref,
            extracted.offer_letter_doc_ref,
            edits.offer_letter_doc_ref,
        ),
    };

    // Declining the offer letter clears the admission details outright;
    // downstream routing and estimation must not see stale offer data.
    if section.has_offer_letter == Some(false) {
        merge.keep_only("hasOfferLetter");
        return Reconciled {
            data: AdmissionKyc {
                has_offer_letter: Some(false),
                ..AdmissionKyc::default()
            },
            provenance: merge.into_updates(),
        };
    }

    Reconciled {
        data: section,
        provenance: merge.into_updates(),
    }
}

pub fn reconcile_personal(
    existing: Option<PersonalKyc>,
    extracted: Option<PersonalKyc>,
    edits: PersonalKyc,
    edited_at: DateTime<Utc>,
    today: NaiveDate,
) -> Reconciled<PersonalKyc> {
    let existing = sanitize_personal(existing.unwrap_or_default());
    let extracted = sanitize_personal(extracted.unwrap_or_default());
    let edits = sanitize_personal(edits);

    let mut merge = Merge::new(SectionKind::PersonalKyc.key(), edited_at);
    let previous_dob = existing.date_of_birth;
    let mut doc_refs = existing.doc_refs.clone();
    for doc_ref in edits.doc_refs.iter().chain(extracted.doc_refs.iter()) {
        if !doc_refs.contains(doc_ref) {
            doc_refs.push(doc_ref.clone());
        }
    }

    let mut section = PersonalKyc {
        id_document_type: merge.pick(
            "idDocumentType",
            existing.id_document_type,
            extracted.id_document_type,
            edits.id_document_type,
        ),
        id_number: merge.pick(
            "idNumber",
            existing.id_number,
            extracted.id_number,
            edits.id_number,
        ),
        passport_number: merge.pick(
            "passportNumber",
            existing.passport_number,
            extracted.passport_number,
            edits.passport_number,
        ),
        date_of_birth: merge.pick(
            "dateOfBirth",
            existing.date_of_birth,
            extracted.date_of_birth,
            edits.date_of_birth,
        ),
        age_in_years: merge.pick(
            "ageInYears",
            existing.age_in_years,
            extracted.age_in_years,
            edits.age_in_years,
        ),
        country_of_user: merge.pick(
            "countryOfUser",
            existing.country_of_user,
            extracted.country_of_user,
            edits.country_of_user,
        ),
        permanent_address: merge.pick(
            "permanentAddress",
            existing.permanent_address,
            extracted.permanent_address,
            edits.permanent_address,
        ),
        doc_refs,
    };

    // Age is derived: any change to the date of birth recomputes it, and a
    // known date always backfills a missing age.
    if section.date_of_birth != previous_dob
        || (section.age_in_years.is_none() && section.date_of_birth.is_some())
    {
        section.recompute_age(today);
    }

    Reconciled {
        data: section,
        provenance: merge.into_updates(),
    }
}

pub fn reconcile_co_signatory(
    existing: Option<CoSignatory>,
    extracted: Option<CoSignatory>,
    edits: CoSignatory,
    edited_at: DateTime<Utc>,
) -> Reconciled<CoSignatory> {
    let existing = sanitize_co_signatory(existing.unwrap_or_default());
    let extracted = sanitize_co_signatory(extracted.unwrap_or_default());
    let edits = sanitize_co_signatory(edits);

    let mut merge = Merge::new("professionalKyc.coSignatory", edited_at);
    let section = CoSignatory {
        choice: merge.pick("choice", existing.choice, extracted.choice, edits.choice),
        id_doc_ref: merge.pick(
            "idDocRef",
            existing.id_doc_ref,
            extracted.id_doc_ref,
            edits.id_doc_ref,
        ),
        relationship: merge.pick(
            "relationship",
            existing.relationship,
            extracted.relationship,
            edits.relationship,
        ),
        extracted_id_number: merge.pick(
            "extractedIdNumber",
            existing.extracted_id_number,
            extracted.extracted_id_number,
            edits.extracted_id_number,
        ),
        extracted_name: merge.pick(
            "extractedName",
            existing.extracted_name,
            extracted.extracted_name,
            edits.extracted_name,
        ),
    };

    Reconciled {
        data: section,
        provenance: merge.into_updates(),
    }
}

pub fn reconcile_work_employment(
    existing: Option<WorkEmployment>,
    extracted: Option<WorkEmployment>,
    edits: WorkEmployment,
    edited_at: DateTime<Utc>,
) -> Reconciled<WorkEmployment> {
    let existing = sanitize_work_employment(existing.unwrap_or_default());
    let extracted = sanitize_work_employment(extracted.unwrap_or_default());
    let edits = sanitize_work_employment(edits);

    let mut merge = Merge::new("professionalKyc.workEmployment", edited_at);
    let section = WorkEmployment {
        industry: merge.pick(
            "industry",
            existing.industry,
            extracted.industry,
            edits.industry,
        ),
        years_experience: merge.pick(
            "yearsExperience",
            existing.years_experience,
            extracted.years_experience,
            edits.years_experience,
        ),
        months_experience: merge.pick(
            "monthsExperience",
            existing.months_experience,
            extracted.months_experience,
            edits.months_experience,
        ),
        proof_type: merge.pick(
            "proofType",
            existing.proof_type,
            extracted.proof_type,
            edits.proof_type,
        ),
        extracted_years: merge.pick(
            "extractedYears",
            existing.extracted_years,
            extracted.extracted_years,
            edits.extracted_years,
        ),
        extracted_industry: merge.pick(
            "extractedIndustry",
            existing.extracted_industry,
            extracted.extracted_industry,
            edits.extracted_industry,
        ),
        currently_working: merge.pick(
            "currentlyWorking",
            existing.currently_working,
            extracted.currently_working,
            edits.currently_working,
        ),
        monthly_salary: merge.pick(
            "monthlySalary",
            existing.monthly_salary,
            extracted.monthly_salary,
            edits.monthly_salary,
        ),
        currency: merge.pick(
            "currency",
            existing.currency,
            extracted.currency,
            edits.currency,
        ),
    };

    Reconciled {
        data: section,
        provenance: merge.into_updates(),
    }
}

/// Academic answers are user-entered only; the merge is stored value
/// versus edit, leaf by leaf, followed by the language exemption.
pub fn reconcile_academic(
    existing: Option<AcademicKyc>,
    edits: AcademicKyc,
    ctx: &AcademicContext,
    edited_at: DateTime<Utc>,
) -> Reconciled<AcademicKyc> {
    let existing = sanitize_academic(existing.unwrap_or_default());
    let edits = sanitize_academic(edits);

    let mut merge = Merge::new(SectionKind::AcademicKyc.key(), edited_at);
    let mut section = AcademicKyc {
        graduation: merge_education(&mut merge, "graduation", existing.graduation, edits.graduation),
        post_graduation: merge_education(
            &mut merge,
            "postGraduation",
            existing.post_graduation,
            edits.post_graduation,
        ),
        language_test: merge_language_test(&mut merge, existing.language_test, edits.language_test),
        course_test: merge_course_test(&mut merge, existing.course_test, edits.course_test),
    };
    section.apply_language_exemption(ctx);

    Reconciled {
        data: section,
        provenance: merge.into_updates(),
    }
}

pub fn reconcile_preferences(
    existing: Option<StudyPreferences>,
    edits: StudyPreferences,
    edited_at: DateTime<Utc>,
) -> Reconciled<StudyPreferences> {
    let existing = sanitize_preferences(existing.unwrap_or_default());
    let edits = sanitize_preferences(edits);

    let mut merge = Merge::new(SectionKind::Preferences.key(), edited_at);
    let section = StudyPreferences {
        country1: merge.pick("country1", existing.country1, None, edits.country1),
        country2: merge.pick("country2", existing.country2, None, edits.country2),
        course_level: merge.pick("courseLevel", existing.course_level, None, edits.course_level),
        course_name: merge.pick("courseName", existing.course_name, None, edits.course_name),
    };

    Reconciled {
        data: section,
        provenance: merge.into_updates(),
    }
}

/// The lender selection replaces any previous one; blank names are
/// dropped and duplicates collapse while keeping first-seen order.
pub fn reconcile_selection(selection: LenderSelection) -> LenderSelection {
    let mut names: Vec<String> = Vec::new();
    for name in selection.selected_lender_names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !names.iter().any(|kept| kept == trimmed) {
            names.push(trimmed.to_string());
        }
    }
    LenderSelection {
        selected_lender_names: names,
    }
}

fn merge_education(
    merge: &mut Merge,
    slot: &str,
    existing: EducationRecord,
    edits: EducationRecord,
) -> EducationRecord {
    EducationRecord {
        level: merge.pick(&format!("{slot}.level"), existing.level, None, edits.level),
        percentage: merge.pick(
            &format!("{slot}.percentage"),
            existing.percentage,
            None,
            edits.percentage,
        ),
        completed_on: MonthYear {
            month: merge.pick(
                &format!("{slot}.completedOn.month"),
                existing.completed_on.month,
                None,
                edits.completed_on.month,
            ),
            year: merge.pick(
                &format!("{slot}.completedOn.year"),
                existing.completed_on.year,
                None,
                edits.completed_on.year,
            ),
        },
        pursuing_course: merge.pick(
            &format!("{slot}.pursuingCourse"),
            existing.pursuing_course,
            None,
            edits.pursuing_course,
        ),
        pursuing_type: merge.pick(
            &format!("{slot}.pursuingType"),
            existing.pursuing_type,
            None,
            edits.pursuing_type,
        ),
        expected_completion: MonthYear {
            month: merge.pick(
                &format!("{slot}.expectedCompletion.month"),
                existing.expected_completion.month,
                None,
                edits.expected_completion.month,
            ),
            year: merge.pick(
                &format!("{slot}.expectedCompletion.year"),
                existing.expected_completion.year,
                None,
                edits.expected_completion.year,
            ),
        },
        justification: merge.pick(
            &format!("{slot}.justification"),
            existing.justification,
            None,
            edits.justification,
        ),
    }
}

fn merge_language_test(merge: &mut Merge, existing: LanguageTest, edits: LanguageTest) -> LanguageTest {
    LanguageTest {
        given: merge.pick("languageTest.given", existing.given, None, edits.given),
        test_type: merge.pick(
            "languageTest.testType",
            existing.test_type,
            None,
            edits.test_type,
        ),
        score: merge.pick("languageTest.score", existing.score, None, edits.score),
        meets_threshold: merge.pick(
            "languageTest.meetsThreshold",
            existing.meets_threshold,
            None,
            edits.meets_threshold,
        ),
        test_date: merge.pick(
            "languageTest.testDate",
            existing.test_date,
            None,
            edits.test_date,
        ),
    }
}

fn merge_course_test(merge: &mut Merge, existing: CourseTest, edits: CourseTest) -> CourseTest {
    CourseTest {
        given: merge.pick("courseTest.given", existing.given, None, edits.given),
        test_type: merge.pick(
            "courseTest.testType",
            existing.test_type,
            None,
            edits.test_type,
        ),
        score: merge.pick("courseTest.score", existing.score, None, edits.score),
        test_date: merge.pick(
            "courseTest.testDate",
            existing.test_date,
            None,
            edits.test_date,
        ),
    }
}

fn sanitize_admission(section: AdmissionKyc) -> AdmissionKyc {
    AdmissionKyc {
        has_offer_letter: section.has_offer_letter,
        student_name: normalize_field(section.student_name),
        university_name: normalize_field(section.university_name),
        course_name: normalize_field(section.course_name),
        admission_level: normalize_field(section.admission_level),
        admission_fees: normalize_field(section.admission_fees),
        fees_currency: normalize_field(section.fees_currency),
        course_start_date: section.course_start_date,
        offer_letter_type: section.offer_letter_type,
        offer_letter_doc_ref: normalize_field(section.offer_letter_doc_ref),
    }
}

fn sanitize_personal(section: PersonalKyc) -> PersonalKyc {
    PersonalKyc {
        id_document_type: section.id_document_type,
        id_number: normalize_field(section.id_number),
        passport_number: normalize_field(section.passport_number),
        date_of_birth: section.date_of_birth,
        age_in_years: section.age_in_years,
        country_of_user: normalize_field(section.country_of_user),
        permanent_address: normalize_field(section.permanent_address),
        doc_refs: section
            .doc_refs
            .into_iter()
            .filter(|doc_ref| !doc_ref.trim().is_empty())
            .collect(),
    }
}

fn sanitize_co_signatory(section: CoSignatory) -> CoSignatory {
    CoSignatory {
        choice: section.choice,
        id_doc_ref: normalize_field(section.id_doc_ref),
        relationship: normalize_field(section.relationship),
        extracted_id_number: normalize_field(section.extracted_id_number),
        extracted_name: normalize_field(section.extracted_name),
    }
}

fn sanitize_work_employment(section: WorkEmployment) -> WorkEmployment {
    WorkEmployment {
        industry: normalize_field(section.industry),
        years_experience: section.years_experience,
        months_experience: section.months_experience,
        proof_type: section.proof_type,
        extracted_years: normalize_field(section.extracted_years),
        extracted_industry: normalize_field(section.extracted_industry),
        currently_working: section.currently_working,
        monthly_salary: section.monthly_salary,
        currency: normalize_field(section.currency),
    }
}

fn sanitize_academic(section: AcademicKyc) -> AcademicKyc {
    AcademicKyc {
        graduation: sanitize_education(section.graduation),
        post_graduation: sanitize_education(section.post_graduation),
        language_test: LanguageTest {
            given: section.language_test.given,
            test_type: section.language_test.test_type,
            score: normalize_field(section.language_test.score),
            meets_threshold: section.language_test.meets_threshold,
            test_date: section.language_test.test_date,
        },
        course_test: CourseTest {
            given: section.course_test.given,
            test_type: section.course_test.test_type,
            score: normalize_field(section.course_test.score),
            test_date: section.course_test.test_date,
        },
    }
}

fn sanitize_education(record: EducationRecord) -> EducationRecord {
    EducationRecord {
        level: record.level,
        percentage: record.percentage,
        completed_on: record.completed_on,
        pursuing_course: normalize_field(record.pursuing_course),
        pursuing_type: record.pursuing_type,
        expected_completion: record.expected_completion,
        justification: normalize_field(record.justification),
    }
}

fn sanitize_preferences(section: StudyPreferences) -> StudyPreferences {
    StudyPreferences {
        country1: normalize_field(section.country1),
        country2: normalize_field(section.country2),
        course_level: section.course_level,
        course_name: normalize_field(section.course_name),
    }
}
