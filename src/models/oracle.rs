use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Spot price published by an oracle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OraclePrice {
    /// Asset symbol (e.g., "BTC")
    pub symbol: String,

    /// Price in USD
    pub price: f64,

    /// Confidence interval width in USD
    pub confidence: f64,

    /// When the oracle published this price
    pub publish_time: DateTime<Utc>,
}

/// Gap between a market's implied asset price and the oracle spot price
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleSignal {
    pub event_id: String,
    pub question: String,
    pub symbol: String,

    /// Market odds for the YES outcome, in percent
    pub market_odds: f64,

    /// Price target named in the question
    pub target_price: f64,

    pub oracle_price: f64,

    /// Spot price implied by the market odds
    pub implied_price: f64,

    /// (oracle - implied) / implied in percent
    pub profit_margin: f64,

    /// Heuristic confidence in [0, 100]
    pub confidence: f64,

    pub detected_at: DateTime<Utc>,
}
