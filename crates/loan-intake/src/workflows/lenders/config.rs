use serde::{Deserialize, Serialize};

/// Tunable dials for the loan estimation rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Lower bound of the estimated range as a share of admission fees.
    pub lower_bound_ratio: f64,
    /// Upper bound of the estimated range as a share of admission fees.
    pub upper_bound_ratio: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            lower_bound_ratio: 0.80,
            upper_bound_ratio: 0.85,
        }
    }
}
