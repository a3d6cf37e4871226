// Post-vs-account-average comparison for the insights views.

use serde::Serialize;

use crate::diff::{relative_percent, round2};

/// Band around the account average that still counts as "average".
pub const AVERAGE_BAND_PERCENT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Above,
    Average,
    Below,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Above => write!(f, "above"),
            Self::Average => write!(f, "average"),
            Self::Below => write!(f, "below"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceScore {
    pub value: f64,
    pub account_average: f64,
    pub delta_percent: f64,
    pub tier: Tier,
}

/// Score one post's metric against the account average for that metric.
pub fn score_against_average(value: f64, account_average: f64) -> PerformanceScore {
    let delta_percent = round2(relative_percent(account_average, value));
    let tier = if delta_percent > AVERAGE_BAND_PERCENT {
        Tier::Above
    } else if delta_percent < -AVERAGE_BAND_PERCENT {
        Tier::Below
    } else {
        Tier::Average
    };

    PerformanceScore {
        value,
        account_average,
        delta_percent,
        tier,
    }
}

/// Arithmetic mean, `None` for no values.
pub fn account_average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}
