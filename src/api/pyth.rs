use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::api::oracle::{ensure_fresh, PriceOracle};
use crate::error::DetectionError;
use crate::models::OraclePrice;

/// Pyth price feed ids by asset symbol
const FEED_IDS: &[(&str, &str)] = &[
    (
        "BTC",
        "e62df6c8b4a85fe1a67db44dc12de5db330f7ac66b72dc658afedf0f4a415b43",
    ),
    (
        "ETH",
        "ff61491a931112ddf1bd8147cd1b641375f79f5825126d665480874634fd0ace",
    ),
];

/// Client for the Pyth Hermes price service
pub struct PythOracle {
    client: Client,
    base_url: String,
    feed_ids: HashMap<String, String>,
    max_age_secs: i64,
}

#[derive(Debug, Deserialize)]
struct PriceFeedResponse {
    id: String,
    price: PriceData,
}

#[derive(Debug, Deserialize)]
struct PriceData {
    price: String,
    conf: String,
    expo: i32,
    publish_time: i64,
}

impl PythOracle {
    pub fn new(base_url: &str, timeout: Duration, max_age_secs: i64) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Pyth HTTP client")?;

        let feed_ids = FEED_IDS
            .iter()
            .map(|(symbol, id)| (symbol.to_string(), id.to_string()))
            .collect();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            feed_ids,
            max_age_secs,
        })
    }

    /// Whether a feed id is known for `symbol`
    pub fn supports(&self, symbol: &str) -> bool {
        self.feed_ids.contains_key(symbol)
    }

    async fn fetch_latest(&self, symbol: &str, feed_id: &str) -> Result<OraclePrice> {
        let url = format!(
            "{}/api/latest_price_feeds?{}={}",
            self.base_url,
            urlencoding::encode("ids[]"),
            urlencoding::encode(feed_id)
        );
        debug!("Fetching {} price from: {}", symbol, url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to fetch Pyth price feed")?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Pyth API error: {} - {}", status, text);
        }

        let feeds: Vec<PriceFeedResponse> = response
            .json()
            .await
            .context("Failed to parse Pyth price feed response")?;

        let feed = feeds
            .into_iter()
            .find(|f| f.id.trim_start_matches("0x") == feed_id)
            .context("Requested feed missing from response")?;

        convert_price(symbol, feed.price)
    }
}

#[async_trait]
impl PriceOracle for PythOracle {
    async fn fetch_price(&self, symbol: &str) -> Result<OraclePrice, DetectionError> {
        let Some(feed_id) = self.feed_ids.get(symbol) else {
            return Err(DetectionError::Oracle {
                symbol: symbol.to_string(),
                reason: "no Pyth feed configured".to_string(),
            });
        };

        let price = self
            .fetch_latest(symbol, feed_id)
            .await
            .map_err(|e| DetectionError::Oracle {
                symbol: symbol.to_string(),
                reason: format!("{:#}", e),
            })?;

        ensure_fresh(price, self.max_age_secs, Utc::now())
    }
}

/// Apply the feed exponent to the raw integer price and confidence
fn convert_price(symbol: &str, data: PriceData) -> Result<OraclePrice> {
    let raw_price: i64 = data.price.parse().context("Invalid Pyth price")?;
    let raw_conf: u64 = data.conf.parse().context("Invalid Pyth confidence")?;
    let scale = 10f64.powi(data.expo);

    let publish_time = DateTime::<Utc>::from_timestamp(data.publish_time, 0)
        .context("Invalid Pyth publish time")?;

    Ok(OraclePrice {
        symbol: symbol.to_string(),
        price: raw_price as f64 * scale,
        confidence: raw_conf as f64 * scale,
        publish_time,
    })
}
