use chrono::{DateTime, Utc};
use thiserror::Error;

use super::academic::AcademicContext;
use super::domain::{CanonicalRecord, SectionKind};

/// Why a review confirmation was refused.
#[derive(Debug, Error, PartialEq)]
pub enum ConsentError {
    #[error("consent requires a complete {section} section")]
    SectionIncomplete { section: SectionKind },
}

/// Record the applicant's review confirmation for one section.
///
/// The timestamp is supplied by the caller and lands in the record's
/// consent map; confirming again simply refreshes it. Incomplete or
/// missing sections cannot be confirmed.
pub fn record_section_consent(
    record: &CanonicalRecord,
    section: SectionKind,
    at: DateTime<Utc>,
    ctx: &AcademicContext,
) -> Result<(SectionKind, DateTime<Utc>), ConsentError> {
    if !record.section_complete(section, ctx) {
        return Err(ConsentError::SectionIncomplete { section });
    }
    Ok((section, at))
}
