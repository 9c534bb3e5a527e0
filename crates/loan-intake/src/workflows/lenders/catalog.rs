use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum CatalogImportError {
    #[error("failed to read lender catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid lender catalog row: {0}")]
    Csv(#[from] csv::Error),
    #[error("lender catalog has no usable rows")]
    Empty,
}

/// One row of the lender catalog. Optional fields stay `None` when the
/// source sheet leaves them blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lender {
    pub name: String,
    pub base_country: Option<String>,
    pub loan_currency: Option<String>,
    pub interest_rate: Option<String>,
    pub website: Option<String>,
}

/// Read boundary to the lender catalog. The catalog is reference data:
/// recommendation passes read it and never write it back.
pub trait LenderCatalog: Send + Sync {
    fn list(&self) -> Vec<Lender>;
}

/// In-memory catalog, loaded once at startup from a CSV export or built
/// directly from rows.
#[derive(Debug, Clone, Default)]
pub struct StaticLenderCatalog {
    lenders: Vec<Lender>,
}

#[derive(Debug, Deserialize)]
struct LenderRow {
    #[serde(rename = "Lender Name", default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(rename = "Base Country", default, deserialize_with = "empty_string_as_none")]
    base_country: Option<String>,
    #[serde(rename = "Loan Currency", default, deserialize_with = "empty_string_as_none")]
    loan_currency: Option<String>,
    #[serde(rename = "Interest Rate", default, deserialize_with = "empty_string_as_none")]
    interest_rate: Option<String>,
    #[serde(rename = "Website", default, deserialize_with = "empty_string_as_none")]
    website: Option<String>,
}

impl StaticLenderCatalog {
    pub fn new(lenders: Vec<Lender>) -> Self {
        Self { lenders }
    }

    /// Parse a catalog CSV. Rows without a lender name are skipped with a
    /// warning; an import that yields nothing at all is an error.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, CatalogImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut lenders = Vec::new();
        for row in csv_reader.deserialize::<LenderRow>() {
            let row = row?;
            let name = match row.name {
                Some(name) => name,
                None => {
                    warn!("skipping lender catalog row without a name");
                    continue;
                }
            };
            lenders.push(Lender {
                name,
                base_country: row.base_country,
                loan_currency: row.loan_currency,
                interest_rate: row.interest_rate,
                website: row.website,
            });
        }
        if lenders.is_empty() {
            return Err(CatalogImportError::Empty);
        }
        Ok(Self::new(lenders))
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogImportError> {
        let file = File::open(path)?;
        Self::from_csv_reader(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.lenders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lenders.is_empty()
    }
}

impl LenderCatalog for StaticLenderCatalog {
    fn list(&self) -> Vec<Lender> {
        self.lenders.clone()
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}
