use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Quote;

/// Resolution horizon classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    /// 90 days or fewer
    Short,
    /// 91 - 365 days
    Medium,
    /// Over a year
    Long,
}

impl TimeBucket {
    pub fn from_days(days: i64) -> Self {
        if days <= 90 {
            TimeBucket::Short
        } else if days <= 365 {
            TimeBucket::Medium
        } else {
            TimeBucket::Long
        }
    }
}

/// Time-adjusted view of a profit margin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnAnalysis {
    /// Single-period profit margin in percent
    pub raw_return: f64,

    /// Whole days until resolution, at least 1
    pub days_to_resolution: i64,

    /// Margin compounded to a 365-day basis, in percent
    pub annualized_return: f64,

    /// Minimum annualized return for this horizon
    pub benchmark_threshold: f64,

    pub beats_benchmark: bool,

    /// Annualized return discounted by confidence and liquidity
    pub risk_adjusted_score: f64,

    pub time_bucket: TimeBucket,
}

/// Suggested handling of an opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Execute,
    Monitor,
    Skip,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Execute => "EXECUTE",
            Recommendation::Monitor => "MONITOR",
            Recommendation::Skip => "SKIP",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule-based risk view of an opportunity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    /// Sum of the rule adjustments; higher is riskier, may be negative
    pub risk_score: f64,

    pub recommendation: Recommendation,

    /// One line per rule that fired, ending with the recommendation
    pub reasoning: Vec<String>,
}

/// A priced gap between two quotes on the same event and outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    /// Stable identifier: matching key plus buy/sell platforms
    pub id: String,

    /// Question text of the buy leg
    pub question: String,

    /// Cheapest quote in the cluster
    pub buy_quote: Quote,

    /// Most expensive quote in the cluster
    pub sell_quote: Quote,

    /// (sell - buy) / buy in percent
    pub spread_percent: f64,

    /// Spread net of estimated fees, in percent
    pub profit_margin: f64,

    /// Match confidence in [0, 95]
    pub match_confidence: f64,

    pub matched_keywords: Vec<String>,

    pub return_analysis: ReturnAnalysis,

    pub risk: RiskAssessment,

    /// Risk-adjusted Kelly fraction of bankroll, capped at 10%
    pub suggested_stake_fraction: f64,

    pub detected_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_bucket_boundaries() {
        assert_eq!(TimeBucket::from_days(1), TimeBucket::Short);
        assert_eq!(TimeBucket::from_days(90), TimeBucket::Short);
        assert_eq!(TimeBucket::from_days(91), TimeBucket::Medium);
        assert_eq!(TimeBucket::from_days(365), TimeBucket::Medium);
        assert_eq!(TimeBucket::from_days(366), TimeBucket::Long);
    }

    #[test]
    fn test_recommendation_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&Recommendation::Monitor).unwrap(),
            "\"MONITOR\""
        );
        assert_eq!(Recommendation::Execute.to_string(), "EXECUTE");
    }

    #[test]
    fn test_time_bucket_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TimeBucket::Medium).unwrap(),
            "\"medium\""
        );
    }
}
