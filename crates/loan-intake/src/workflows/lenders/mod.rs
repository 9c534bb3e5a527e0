//! Lender matching and loan estimation for the recommendations step.

mod catalog;
mod classify;
mod config;
mod estimate;

pub use catalog::{CatalogImportError, Lender, LenderCatalog, StaticLenderCatalog};
pub use classify::{applicant_home_country, classify_lender, LenderScope};
pub use config::MatchConfig;
pub use estimate::{estimate_loan_amount, LoanEstimate};

use serde::Serialize;

use crate::workflows::intake::domain::CanonicalRecord;

/// One catalog lender annotated for a specific applicant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedLender {
    #[serde(flatten)]
    pub lender: Lender,
    pub scope: LenderScope,
    pub scope_label: &'static str,
    pub estimated_loan_amount: String,
}

/// Catalog split for the recommendations screen, catalog order preserved
/// within each bucket.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LenderRecommendations {
    pub home_country: Option<String>,
    pub estimated_loan_amount: String,
    pub domestic: Vec<AnnotatedLender>,
    pub foreign: Vec<AnnotatedLender>,
}

/// Applies the classification and estimation rules to a whole catalog.
/// The pass is read-only with respect to both the record and the
/// catalog; a lender that cannot be classified lands in the foreign
/// bucket rather than failing the pass.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: MatchConfig,
}

impl RecommendationEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn recommend(
        &self,
        record: &CanonicalRecord,
        lenders: &[Lender],
    ) -> LenderRecommendations {
        let home_country = applicant_home_country(record);
        let admission = record.admission_kyc.as_ref();
        let estimate = match admission.and_then(|section| section.admission_fees.as_deref()) {
            Some(fees) => estimate_loan_amount(
                fees,
                admission.and_then(|section| section.fees_currency.as_deref()),
                &self.config,
            ),
            None => LoanEstimate::Unavailable,
        };
        let estimated_loan_amount = estimate.to_string();

        let mut domestic = Vec::new();
        let mut foreign = Vec::new();
        for lender in lenders {
            let scope = classify_lender(home_country.as_deref(), lender);
            let annotated = AnnotatedLender {
                lender: lender.clone(),
                scope,
                scope_label: scope.label(),
                estimated_loan_amount: estimated_loan_amount.clone(),
            };
            match scope {
                LenderScope::Domestic => domestic.push(annotated),
                LenderScope::Foreign => foreign.push(annotated),
            }
        }

        LenderRecommendations {
            home_country,
            estimated_loan_amount,
            domestic,
            foreign,
        }
    }
}
