use chrono::NaiveDate;
use loan_intake::workflows::intake::{
    AdmissionKyc, BlobError, BlobStore, BlobUpload, CanonicalRecord, CoSignatory, DocumentContent,
    DocumentExtractor, DocumentKind, ExtractedDocument, ExtractedFields, IdDocumentType,
    OfferLetterType, PersonalKyc, RecordPatch, RecordStore, StoreError, StoredBlob, UserId,
    WorkEmployment,
};
use loan_intake::workflows::lenders::{Lender, StaticLenderCatalog};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryRecordStore {
    records: Arc<Mutex<HashMap<UserId, CanonicalRecord>>>,
}

impl RecordStore for InMemoryRecordStore {
    fn save(&self, user_id: &UserId, patch: RecordPatch) -> Result<CanonicalRecord, StoreError> {
        let mut guard = self.records.lock().expect("record store mutex poisoned");
        let current = guard
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| CanonicalRecord::new(user_id.clone()));
        let merged = current.merged(patch);
        guard.insert(user_id.clone(), merged.clone());
        Ok(merged)
    }

    fn fetch(&self, user_id: &UserId) -> Result<Option<CanonicalRecord>, StoreError> {
        let guard = self.records.lock().expect("record store mutex poisoned");
        Ok(guard.get(user_id).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryBlobStore {
    uploads: Arc<Mutex<Vec<(UserId, BlobUpload)>>>,
}

impl BlobStore for InMemoryBlobStore {
    fn upload(&self, user_id: &UserId, upload: BlobUpload) -> Result<StoredBlob, BlobError> {
        let mut guard = self.uploads.lock().expect("blob store mutex poisoned");
        let reference = format!("mem://{}/{}", user_id.0, upload.file_name);
        guard.push((user_id.clone(), upload));
        Ok(StoredBlob {
            reference,
            download_url: None,
        })
    }
}

impl InMemoryBlobStore {
    pub(crate) fn stored(&self) -> Vec<(UserId, BlobUpload)> {
        self.uploads.lock().expect("blob store mutex poisoned").clone()
    }
}

/// Offline extractor for pre-OCR'd documents: reads `Label: value` lines
/// out of text content. Stands in for the hosted document-AI backend in
/// local runs; URI content cannot be fetched here and degrades to a
/// failed extraction.
#[derive(Default, Clone)]
pub(crate) struct LabelledTextExtractor;

impl DocumentExtractor for LabelledTextExtractor {
    fn extract(&self, kind: DocumentKind, content: &DocumentContent) -> ExtractedDocument {
        let text = match content {
            DocumentContent::Text(text) => text,
            DocumentContent::Uri(_) => return ExtractedDocument::failed(kind),
        };
        let values = labelled_values(text);
        if values.is_empty() {
            return ExtractedDocument::failed(kind);
        }

        let fields = match kind {
            DocumentKind::OfferLetter => ExtractedFields::Admission(AdmissionKyc {
                student_name: text_value(&values, "student name"),
                university_name: text_value(&values, "university"),
                course_name: text_value(&values, "course"),
                admission_level: text_value(&values, "level"),
                admission_fees: text_value(&values, "fees"),
                fees_currency: text_value(&values, "currency"),
                course_start_date: date_value(&values, "start date"),
                offer_letter_type: offer_type_value(&values),
                ..AdmissionKyc::default()
            }),
            DocumentKind::PanCard | DocumentKind::NationalId => {
                ExtractedFields::Personal(PersonalKyc {
                    id_document_type: Some(if kind == DocumentKind::PanCard {
                        IdDocumentType::Pan
                    } else {
                        IdDocumentType::NationalId
                    }),
                    id_number: text_value(&values, "id number"),
                    date_of_birth: date_value(&values, "date of birth"),
                    country_of_user: text_value(&values, "country"),
                    permanent_address: text_value(&values, "address"),
                    ..PersonalKyc::default()
                })
            }
            DocumentKind::Passport => ExtractedFields::Personal(PersonalKyc {
                passport_number: text_value(&values, "passport number"),
                date_of_birth: date_value(&values, "date of birth"),
                country_of_user: text_value(&values, "country"),
                ..PersonalKyc::default()
            }),
            DocumentKind::CoSignatoryId => ExtractedFields::CoSignatory(CoSignatory {
                extracted_id_number: text_value(&values, "id number"),
                extracted_name: text_value(&values, "name"),
                ..CoSignatory::default()
            }),
            DocumentKind::Resume => ExtractedFields::WorkEmployment(WorkEmployment {
                extracted_industry: text_value(&values, "industry"),
                extracted_years: text_value(&values, "years"),
                ..WorkEmployment::default()
            }),
        };
        ExtractedDocument::succeeded(kind, fields)
    }
}

fn labelled_values(text: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for line in text.lines() {
        if let Some((label, value)) = line.split_once(':') {
            let label = label.trim().to_ascii_lowercase();
            let value = value.trim();
            if !label.is_empty() && !value.is_empty() {
                values.insert(label, value.to_string());
            }
        }
    }
    values
}

fn text_value(values: &HashMap<String, String>, label: &str) -> Option<String> {
    values.get(label).cloned()
}

fn date_value(values: &HashMap<String, String>, label: &str) -> Option<NaiveDate> {
    values.get(label).and_then(|raw| parse_date(raw).ok())
}

fn offer_type_value(values: &HashMap<String, String>) -> Option<OfferLetterType> {
    match values.get("offer type").map(|value| value.to_ascii_lowercase()) {
        Some(value) if value == "conditional" => Some(OfferLetterType::Conditional),
        Some(value) if value == "unconditional" => Some(OfferLetterType::Unconditional),
        _ => None,
    }
}

/// Fallback catalog for runs without an `APP_LENDER_CATALOG` export.
pub(crate) fn built_in_lender_catalog() -> StaticLenderCatalog {
    StaticLenderCatalog::new(vec![
        lender(
            "State Bank of India",
            Some("India"),
            Some("INR"),
            Some("9.15%"),
            Some("https://sbi.co.in"),
        ),
        lender(
            "Axis Bank",
            Some("India"),
            Some("INR"),
            Some("10.5%"),
            Some("https://www.axisbank.com"),
        ),
        lender(
            "HDFC Credila",
            Some("India"),
            Some("INR"),
            Some("11%"),
            Some("https://www.hdfccredila.com"),
        ),
        lender(
            "Avanse Financial Services",
            None,
            Some("INR"),
            Some("11.5%"),
            Some("https://www.avanse.com"),
        ),
        lender(
            "Prodigy Finance",
            None,
            Some("USD"),
            Some("12%"),
            Some("https://prodigyfinance.com"),
        ),
        lender(
            "MPower Financing",
            Some("United States"),
            Some("USD"),
            Some("13.98%"),
            Some("https://www.mpowerfinancing.com"),
        ),
    ])
}

fn lender(
    name: &str,
    base_country: Option<&str>,
    loan_currency: Option<&str>,
    interest_rate: Option<&str>,
    website: Option<&str>,
) -> Lender {
    Lender {
        name: name.to_string(),
        base_country: base_country.map(str::to_string),
        loan_currency: loan_currency.map(str::to_string),
        interest_rate: interest_rate.map(str::to_string),
        website: website.map(str::to_string),
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use loan_intake::workflows::intake::ExtractionStatus;

    #[test]
    fn offer_letter_text_extracts_admission_fields() {
        let extractor = LabelledTextExtractor;
        let text = "Student Name: Asha Rao\n\
University: Technical University of Munich\n\
Course: MSc Robotics\n\
Level: Postgraduate\n\
Fees: EUR 12,500 per year\n\
Currency: EUR\n\
Offer Type: conditional\n";

        let document =
            extractor.extract(DocumentKind::OfferLetter, &DocumentContent::Text(text.to_string()));

        assert_eq!(document.status, ExtractionStatus::Succeeded);
        let admission = match document.fields {
            ExtractedFields::Admission(admission) => admission,
            other => panic!("unexpected fields for an offer letter: {other:?}"),
        };
        assert_eq!(admission.student_name.as_deref(), Some("Asha Rao"));
        assert_eq!(
            admission.university_name.as_deref(),
            Some("Technical University of Munich")
        );
        assert_eq!(admission.admission_fees.as_deref(), Some("EUR 12,500 per year"));
        assert_eq!(admission.fees_currency.as_deref(), Some("EUR"));
        assert_eq!(admission.offer_letter_type, Some(OfferLetterType::Conditional));
        assert!(admission.course_start_date.is_none());
    }

    #[test]
    fn uri_content_degrades_to_a_failed_extraction() {
        let extractor = LabelledTextExtractor;
        let document = extractor.extract(
            DocumentKind::Resume,
            &DocumentContent::Uri("drive://uploads/resume.pdf".to_string()),
        );

        assert!(document.is_failure());
        assert_eq!(
            document.fields,
            ExtractedFields::WorkEmployment(WorkEmployment::default())
        );
    }

    #[test]
    fn unlabelled_text_degrades_to_a_failed_extraction() {
        let extractor = LabelledTextExtractor;
        let document = extractor.extract(
            DocumentKind::PanCard,
            &DocumentContent::Text("scanned page with no recognizable fields".to_string()),
        );

        assert!(document.is_failure());
    }
}
