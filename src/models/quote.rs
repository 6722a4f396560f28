use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prediction market venue a quote was sourced from.
///
/// Declaration order is the tie-break order used when two quotes share a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Polymarket,
    Kalshi,
    Manifold,
    PredictIt,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Polymarket => "polymarket",
            Platform::Kalshi => "kalshi",
            Platform::Manifold => "manifold",
            Platform::PredictIt => "predictit",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of a binary market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Yes => "YES",
            Outcome::No => "NO",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized listing for one outcome of one event on one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Source platform
    pub platform: Platform,

    /// Platform-local event identifier
    pub event_id: String,

    /// Market question as listed on the platform
    pub question: String,

    /// Outcome this quote prices
    pub outcome: Outcome,

    /// Implied probability in percent (0 - 100)
    pub odds_percent: f64,

    /// Cost to acquire one unit of `outcome` (0.0 - 1.0)
    pub price: f64,

    /// Traded volume in USD
    pub volume: f64,

    /// When the market resolves
    pub resolution_date: DateTime<Utc>,

    /// When the platform last updated this quote
    pub last_updated: DateTime<Utc>,
}

impl Quote {
    /// Whether the numeric fields sit inside their documented ranges
    pub fn is_well_formed(&self) -> bool {
        (0.0..=100.0).contains(&self.odds_percent)
            && (0.0..=1.0).contains(&self.price)
            && self.volume >= 0.0
            && self.volume.is_finite()
    }
}

/// Quotes believed to price the same event and outcome across platforms
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCluster {
    /// Derived matching key (`<terms>_<OUTCOME>`)
    pub key: String,

    pub outcome: Outcome,

    /// Member quotes in input order
    pub quotes: Vec<Quote>,

    /// Match confidence in [0, 95]
    pub match_confidence: f64,

    /// Words shared by at least two member questions, first-seen order
    pub matched_keywords: Vec<String>,
}

impl EventCluster {
    /// Number of distinct platforms contributing quotes
    pub fn platform_count(&self) -> usize {
        let mut platforms: Vec<Platform> = self.quotes.iter().map(|q| q.platform).collect();
        platforms.sort();
        platforms.dedup();
        platforms.len()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{Duration, Utc};

    use super::*;

    pub fn quote(platform: Platform, question: &str, outcome: Outcome, price: f64) -> Quote {
        Quote {
            platform,
            event_id: format!("{}-{}", platform, question.len()),
            question: question.to_string(),
            outcome,
            odds_percent: price * 100.0,
            price,
            volume: 250_000.0,
            resolution_date: Utc::now() + Duration::days(30),
            last_updated: Utc::now(),
        }
    }
}
