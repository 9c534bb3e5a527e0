//! Loan amount estimation from free-text admission fees.
//!
//! Offer letters state fees in every imaginable shape: currency symbols,
//! thousands grouping in US, European and Indian styles, trailing prose.
//! The parser pulls the first numeric token and decides which separator
//! is the decimal point; anything it cannot make sense of degrades to an
//! unavailable estimate instead of failing the request.

use std::fmt;

use tracing::warn;

use super::config::MatchConfig;

/// Estimated loan range for one applicant, or the explicit absence of
/// one. Renders as `"16000 - 17000 USD"` or `"N/A"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanEstimate {
    Range {
        low: i64,
        high: i64,
        currency: Option<String>,
    },
    Unavailable,
}

impl LoanEstimate {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Range { .. })
    }
}

impl fmt::Display for LoanEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range {
                low,
                high,
                currency: Some(currency),
            } => write!(f, "{low} - {high} {currency}"),
            Self::Range {
                low,
                high,
                currency: None,
            } => write!(f, "{low} - {high}"),
            Self::Unavailable => f.write_str("N/A"),
        }
    }
}

/// Derive the estimated range from the stated admission fees. The stated
/// currency wins over anything sniffed out of the fees text.
pub fn estimate_loan_amount(
    fees: &str,
    stated_currency: Option<&str>,
    config: &MatchConfig,
) -> LoanEstimate {
    let magnitude = match parse_fee_magnitude(fees) {
        Some(magnitude) => magnitude,
        None => {
            warn!(fees, "admission fees could not be parsed; loan estimate unavailable");
            return LoanEstimate::Unavailable;
        }
    };
    let low = (magnitude * config.lower_bound_ratio).round() as i64;
    let high = (magnitude * config.upper_bound_ratio).round() as i64;
    let currency = stated_currency
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| sniff_currency(fees));
    LoanEstimate::Range {
        low,
        high,
        currency,
    }
}

/// Extract the first numeric token and normalize its separators.
///
/// When both `,` and `.` appear, the one further right is the decimal
/// point and the other is grouping. With a single separator kind, a
/// three-digit tail reads as grouping (covers `20,000` as well as the
/// Indian `1,50,000`), anything else as a decimal point. Non-positive
/// and unparsable values yield `None`.
pub(crate) fn parse_fee_magnitude(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let token: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let token = token.trim_end_matches([',', '.']);

    let has_comma = token.contains(',');
    let has_dot = token.contains('.');
    let cleaned = match (has_comma, has_dot) {
        (true, true) => {
            let last_comma = token.rfind(',')?;
            let last_dot = token.rfind('.')?;
            if last_comma > last_dot {
                token.replace('.', "").replace(',', ".")
            } else {
                token.replace(',', "")
            }
        }
        (true, false) => {
            let tail = token.len() - token.rfind(',')? - 1;
            if tail == 3 {
                token.replace(',', "")
            } else {
                token.replace(',', ".")
            }
        }
        (false, true) => {
            let tail = token.len() - token.rfind('.')? - 1;
            let integer_part = &token[..token.find('.')?];
            if tail == 3 && !integer_part.is_empty() && integer_part != "0" {
                token.replace('.', "")
            } else {
                token.to_string()
            }
        }
        (false, false) => token.to_string(),
    };

    cleaned.parse::<f64>().ok().filter(|value| *value > 0.0)
}

/// Best-effort currency detection from the fees text itself: the
/// earliest currency symbol or known three-letter code wins.
pub(crate) fn sniff_currency(text: &str) -> Option<String> {
    const SYMBOLS: [(char, &str); 5] = [
        ('$', "USD"),
        ('€', "EUR"),
        ('£', "GBP"),
        ('₹', "INR"),
        ('¥', "JPY"),
    ];
    const CODES: [&str; 12] = [
        "USD", "EUR", "GBP", "INR", "CAD", "AUD", "NZD", "SGD", "JPY", "CNY", "AED", "CHF",
    ];

    let mut best: Option<(usize, String)> = None;
    for (symbol, code) in SYMBOLS {
        if let Some(index) = text.find(symbol) {
            if best.as_ref().map(|(at, _)| index < *at).unwrap_or(true) {
                best = Some((index, code.to_string()));
            }
        }
    }

    let mut run_start: Option<usize> = None;
    let mut runs: Vec<(usize, &str)> = Vec::new();
    for (index, ch) in text.char_indices() {
        if ch.is_ascii_alphabetic() {
            if run_start.is_none() {
                run_start = Some(index);
            }
        } else if let Some(start) = run_start.take() {
            runs.push((start, &text[start..index]));
        }
    }
    if let Some(start) = run_start {
        runs.push((start, &text[start..]));
    }
    for (index, run) in runs {
        if run.len() != 3 {
            continue;
        }
        let upper = run.to_ascii_uppercase();
        if CODES.contains(&upper.as_str())
            && best.as_ref().map(|(at, _)| index < *at).unwrap_or(true)
        {
            best = Some((index, upper));
        }
    }

    best.map(|(_, code)| code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimates_dollar_fees_with_grouping() {
        let estimate = estimate_loan_amount("$20,000 USD per year", None, &MatchConfig::default());
        assert_eq!(estimate.to_string(), "16000 - 17000 USD");
    }

    #[test]
    fn stated_currency_wins_over_sniffed() {
        let estimate =
            estimate_loan_amount("$20,000 per year", Some("CAD"), &MatchConfig::default());
        assert_eq!(estimate.to_string(), "16000 - 17000 CAD");
    }

    #[test]
    fn reads_european_decimal_style() {
        assert_eq!(parse_fee_magnitude("20.000,50 EUR"), Some(20000.50));
        let estimate = estimate_loan_amount("20.000,50 EUR", None, &MatchConfig::default());
        assert_eq!(estimate.to_string(), "16000 - 17000 EUR");
    }

    #[test]
    fn reads_indian_grouping() {
        assert_eq!(parse_fee_magnitude("Rs 1,50,000 per annum"), Some(150000.0));
    }

    #[test]
    fn single_separator_with_short_tail_is_decimal() {
        assert_eq!(parse_fee_magnitude("1500.75"), Some(1500.75));
        assert_eq!(parse_fee_magnitude("12,34"), Some(12.34));
    }

    #[test]
    fn dot_grouping_without_decimal_is_thousands() {
        assert_eq!(parse_fee_magnitude("fees: 1.234.567"), Some(1234567.0));
        assert_eq!(parse_fee_magnitude("0.125"), Some(0.125));
    }

    #[test]
    fn unparsable_or_zero_fees_are_unavailable() {
        assert_eq!(
            estimate_loan_amount("to be decided", None, &MatchConfig::default()),
            LoanEstimate::Unavailable
        );
        assert_eq!(
            estimate_loan_amount("0", None, &MatchConfig::default()),
            LoanEstimate::Unavailable
        );
        assert_eq!(
            estimate_loan_amount("", None, &MatchConfig::default()),
            LoanEstimate::Unavailable
        );
    }

    #[test]
    fn trailing_separators_are_ignored() {
        assert_eq!(parse_fee_magnitude("5,000."), Some(5000.0));
    }

    #[test]
    fn sniffs_the_earliest_currency_marker() {
        assert_eq!(sniff_currency("€9.500 (approx USD 10k)"), Some("EUR".to_string()));
        assert_eq!(sniff_currency("9500 usd total"), Some("USD".to_string()));
        assert_eq!(sniff_currency("9500 per year"), None);
    }
}
