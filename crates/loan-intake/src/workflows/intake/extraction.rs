use serde::{Deserialize, Serialize};

use super::domain::{AdmissionKyc, CoSignatory, PersonalKyc, WorkEmployment};

/// Document kinds the portal sends out for field extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    OfferLetter,
    PanCard,
    NationalId,
    Passport,
    CoSignatoryId,
    Resume,
}

impl DocumentKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::OfferLetter => "Offer Letter",
            Self::PanCard => "PAN Card",
            Self::NationalId => "National ID",
            Self::Passport => "Passport",
            Self::CoSignatoryId => "Co-Signatory ID",
            Self::Resume => "Resume",
        }
    }
}

/// What the extractor is given to work on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentContent {
    /// Reference to an already-uploaded document.
    Uri(String),
    /// Raw text, for extractors fed pre-OCR'd content.
    Text(String),
}

/// Whether the extraction produced usable fields. A failed extraction is
/// represented as empty section data plus this flag; sentinel text never
/// reaches the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    Succeeded,
    Failed,
}

impl ExtractionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
        }
    }
}

/// Section-shaped payloads an extraction can hydrate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractedFields {
    Admission(AdmissionKyc),
    Personal(PersonalKyc),
    CoSignatory(CoSignatory),
    WorkEmployment(WorkEmployment),
}

/// Outcome of one extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    pub kind: DocumentKind,
    pub status: ExtractionStatus,
    pub fields: ExtractedFields,
}

impl ExtractedDocument {
    pub fn succeeded(kind: DocumentKind, fields: ExtractedFields) -> Self {
        Self {
            kind,
            status: ExtractionStatus::Succeeded,
            fields,
        }
    }

    /// A failed extraction still yields a valid, fully vacant payload for
    /// the document's target section.
    pub fn failed(kind: DocumentKind) -> Self {
        let fields = match kind {
            DocumentKind::OfferLetter => ExtractedFields::Admission(AdmissionKyc::default()),
            DocumentKind::PanCard | DocumentKind::NationalId | DocumentKind::Passport => {
                ExtractedFields::Personal(PersonalKyc::default())
            }
            DocumentKind::CoSignatoryId => ExtractedFields::CoSignatory(CoSignatory::default()),
            DocumentKind::Resume => ExtractedFields::WorkEmployment(WorkEmployment::default()),
        };
        Self {
            kind,
            status: ExtractionStatus::Failed,
            fields,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == ExtractionStatus::Failed
    }
}

/// Boundary to the document-understanding backend. Implementations must
/// already map their own failure modes into `ExtractedDocument::failed`;
/// the intake flow treats extraction as infallible and merely degraded.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, kind: DocumentKind, content: &DocumentContent) -> ExtractedDocument;
}
