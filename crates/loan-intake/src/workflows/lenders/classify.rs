//! Domestic/foreign classification of catalog lenders for one applicant.

use serde::{Deserialize, Serialize};

use crate::workflows::intake::domain::CanonicalRecord;

use super::catalog::Lender;

const INDIA_DIAL_CODE: &str = "+91";
const INDIA_ISO_CODE: &str = "IN";
const INDIA_HOME: &str = "india";
const INR_CURRENCY: &str = "INR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LenderScope {
    Domestic,
    Foreign,
}

impl LenderScope {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Domestic => "Domestic",
            Self::Foreign => "Foreign",
        }
    }
}

/// Normalized home-country signal for an applicant, lowercased for the
/// catalog comparison. The verified mobile is the strongest signal: an
/// Indian dial code or ISO short name resolves straight to `india`, any
/// other short name is taken as-is, and the personal KYC country is the
/// fallback for records without mobile data.
pub fn applicant_home_country(record: &CanonicalRecord) -> Option<String> {
    if let Some(mobile) = &record.mobile {
        let dial_code = mobile.dial_code.as_deref().map(str::trim);
        let short_name = mobile
            .country_short_name
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());
        let india = dial_code == Some(INDIA_DIAL_CODE)
            || short_name
                .map(|code| code.eq_ignore_ascii_case(INDIA_ISO_CODE))
                .unwrap_or(false);
        if india {
            return Some(INDIA_HOME.to_string());
        }
        if let Some(short_name) = short_name {
            return Some(short_name.to_ascii_lowercase());
        }
    }
    record
        .personal_kyc
        .as_ref()
        .and_then(|personal| personal.country_of_user.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_ascii_lowercase)
}

/// Scope of one lender given the applicant's home signal.
///
/// A lender with a known base country is domestic only on a
/// case-insensitive match. A lender known only by currency is domestic
/// only for the INR/India pairing. Everything else, including lenders
/// with no usable data and applicants with no home signal, stays
/// foreign.
pub fn classify_lender(home_country: Option<&str>, lender: &Lender) -> LenderScope {
    let base_country = lender
        .base_country
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(base) = base_country {
        return match home_country {
            Some(home) if base.eq_ignore_ascii_case(home) => LenderScope::Domestic,
            _ => LenderScope::Foreign,
        };
    }
    if let Some(currency) = lender.loan_currency.as_deref().map(str::trim) {
        if currency.eq_ignore_ascii_case(INR_CURRENCY) && home_country == Some(INDIA_HOME) {
            return LenderScope::Domestic;
        }
    }
    LenderScope::Foreign
}
