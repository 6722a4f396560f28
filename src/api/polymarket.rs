use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::api::FeedAdapter;
use crate::error::DetectionError;
use crate::models::{Outcome, Platform, Quote};

const PAGE_LIMIT: &str = "500";

/// Quote feed backed by the Polymarket Gamma API
pub struct PolymarketFeed {
    client: Client,
    base_url: String,
}

/// Market entry from the Gamma `/markets` listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketResponse {
    id: String,
    question: String,
    outcomes: Option<String>,
    outcome_prices: Option<String>,
    volume: Option<String>,
    volume_num: Option<f64>,
    end_date: Option<String>,
    end_date_iso: Option<String>,
    updated_at: Option<String>,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    closed: bool,
}

impl PolymarketFeed {
    /// Create a feed whose requests give up after `timeout`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Polymarket HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch open markets and flatten them into YES/NO quotes
    pub async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
        let url = format!("{}/markets", self.base_url);
        debug!("Fetching Polymarket markets from: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("active", "true"), ("closed", "false"), ("limit", PAGE_LIMIT)])
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to fetch Polymarket markets")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Polymarket API error: {} - {}", status, text);
        }

        let markets: Vec<MarketResponse> = response
            .json()
            .await
            .context("Failed to parse Polymarket markets response")?;

        let now = Utc::now();
        let quotes: Vec<Quote> = markets
            .into_iter()
            .filter(|m| m.active && !m.closed)
            .flat_map(|m| convert_market(m, now))
            .collect();

        info!("Polymarket returned {} quotes", quotes.len());
        Ok(quotes)
    }
}

#[async_trait]
impl FeedAdapter for PolymarketFeed {
    fn platform(&self) -> Platform {
        Platform::Polymarket
    }

    async fn get_all_quotes(&self) -> Result<Vec<Quote>, DetectionError> {
        self.fetch_quotes()
            .await
            .map_err(|e| DetectionError::fetch(Platform::Polymarket, e))
    }
}

/// Convert a binary Yes/No market into one quote per outcome
fn convert_market(market: MarketResponse, now: DateTime<Utc>) -> Vec<Quote> {
    let Some(resolution_date) = market
        .end_date
        .as_deref()
        .or(market.end_date_iso.as_deref())
        .and_then(parse_date)
    else {
        debug!("Market {} has no end date", market.id);
        return Vec::new();
    };

    // Outcome lists arrive as JSON-encoded strings
    let outcomes: Vec<String> = market
        .outcomes
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();
    let prices: Vec<String> = market
        .outcome_prices
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();

    if outcomes.len() != 2 || prices.len() != 2 {
        return Vec::new();
    }

    let volume = market
        .volume_num
        .or_else(|| market.volume.as_ref().and_then(|v| v.parse().ok()))
        .unwrap_or(0.0);

    let last_updated = market
        .updated_at
        .as_deref()
        .and_then(parse_date)
        .unwrap_or(now);

    let mut quotes = Vec::with_capacity(2);

    for (label, price) in outcomes.iter().zip(prices.iter()) {
        let outcome = match label.trim().to_lowercase().as_str() {
            "yes" => Outcome::Yes,
            "no" => Outcome::No,
            _ => return Vec::new(),
        };

        let price: f64 = match price.parse() {
            Ok(p) => p,
            Err(_) => {
                warn!("Unparsable price {:?} on market {}", price, market.id);
                return Vec::new();
            }
        };

        let quote = Quote {
            platform: Platform::Polymarket,
            event_id: market.id.clone(),
            question: market.question.clone(),
            outcome,
            odds_percent: price * 100.0,
            price,
            volume,
            resolution_date,
            last_updated,
        };

        if quote.is_well_formed() {
            quotes.push(quote);
        }
    }

    quotes
}

/// RFC 3339 timestamp or bare `YYYY-MM-DD` date
fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market(outcomes: &str, prices: &str) -> MarketResponse {
        MarketResponse {
            id: "512340".to_string(),
            question: "Will Bitcoin reach $100k by December 31?".to_string(),
            outcomes: Some(outcomes.to_string()),
            outcome_prices: Some(prices.to_string()),
            volume: Some("1250000.5".to_string()),
            volume_num: None,
            end_date: Some("2025-12-31T12:00:00Z".to_string()),
            end_date_iso: None,
            updated_at: None,
            active: true,
            closed: false,
        }
    }

    #[test]
    fn test_convert_binary_market() {
        let now = Utc::now();
        let quotes = convert_market(market(r#"["Yes", "No"]"#, r#"["0.62", "0.38"]"#), now);

        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[0].outcome, Outcome::Yes);
        assert_eq!(quotes[0].price, 0.62);
        assert!((quotes[0].odds_percent - 62.0).abs() < 1e-9);
        assert_eq!(quotes[1].outcome, Outcome::No);
        assert_eq!(quotes[1].volume, 1_250_000.5);
        assert_eq!(quotes[1].last_updated, now);
    }

    #[test]
    fn test_non_binary_market_skipped() {
        let now = Utc::now();
        assert!(convert_market(market(r#"["Spirit", "OG"]"#, r#"["0.5", "0.5"]"#), now).is_empty());
        assert!(convert_market(market(r#"["Yes"]"#, r#"["0.5"]"#), now).is_empty());
        assert!(convert_market(market("not json", r#"["0.5", "0.5"]"#), now).is_empty());
    }

    #[test]
    fn test_market_without_end_date_skipped() {
        let mut m = market(r#"["Yes", "No"]"#, r#"["0.62", "0.38"]"#);
        m.end_date = None;
        m.end_date_iso = Some("2025-12-31".to_string());
        assert_eq!(convert_market(m, Utc::now()).len(), 2);

        let mut m = market(r#"["Yes", "No"]"#, r#"["0.62", "0.38"]"#);
        m.end_date = None;
        assert!(convert_market(m, Utc::now()).is_empty());
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2025-06-01T00:00:00Z").is_some());
        assert!(parse_date("2025-06-01").is_some());
        assert!(parse_date("June 1st").is_none());
    }
}
