use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DetectionError;
use crate::models::OraclePrice;

/// A source of spot prices for single assets
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Latest price for `symbol`; stale data is an error
    async fn fetch_price(&self, symbol: &str) -> Result<OraclePrice, DetectionError>;
}

/// Reject a price published more than `max_age_secs` before `now`
pub fn ensure_fresh(
    price: OraclePrice,
    max_age_secs: i64,
    now: DateTime<Utc>,
) -> Result<OraclePrice, DetectionError> {
    let age_secs = (now - price.publish_time).num_seconds();

    if age_secs > max_age_secs {
        return Err(DetectionError::StalePrice {
            symbol: price.symbol,
            age_secs,
            max_age_secs,
        });
    }

    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn price_at(publish_time: DateTime<Utc>) -> OraclePrice {
        OraclePrice {
            symbol: "BTC".to_string(),
            price: 98_500.0,
            confidence: 40.0,
            publish_time,
        }
    }

    #[test]
    fn test_fresh_price_passes() {
        let now = Utc::now();
        assert!(ensure_fresh(price_at(now - Duration::seconds(60)), 60, now).is_ok());
    }

    #[test]
    fn test_stale_price_rejected() {
        let now = Utc::now();
        let err = ensure_fresh(price_at(now - Duration::seconds(61)), 60, now).unwrap_err();

        match err {
            DetectionError::StalePrice {
                symbol, age_secs, ..
            } => {
                assert_eq!(symbol, "BTC");
                assert_eq!(age_secs, 61);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
