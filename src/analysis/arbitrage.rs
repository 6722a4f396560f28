use std::cmp::Ordering;

use tracing::debug;

use crate::models::{EventCluster, Quote};

/// Cheapest and most expensive legs of a cluster with the gap between them
#[derive(Debug, Clone)]
pub struct PricedSpread {
    pub buy_quote: Quote,
    pub sell_quote: Quote,
    pub spread_percent: f64,
    pub profit_margin: f64,
}

/// Prices the spread inside an event cluster
#[derive(Debug, Clone)]
pub struct ArbitrageCalculator {
    fee_estimate_percent: f64,
}

impl ArbitrageCalculator {
    pub fn new(fee_estimate_percent: f64) -> Self {
        Self {
            fee_estimate_percent,
        }
    }

    /// Spread between the cheapest and dearest quote, or `None` when fees eat it
    ///
    /// Equal prices fall back to platform declaration order, so the earlier
    /// platform wins both the buy and the sell leg.
    pub fn calculate(&self, cluster: &EventCluster) -> Option<PricedSpread> {
        let mut quotes: Vec<&Quote> = cluster.quotes.iter().collect();
        quotes.sort_by(|a, b| {
            a.price
                .total_cmp(&b.price)
                .then_with(|| a.platform.cmp(&b.platform))
        });

        let buy = *quotes.first()?;
        let top_price = quotes.last()?.price;
        let sell = *quotes
            .iter()
            .find(|q| q.price.total_cmp(&top_price) == Ordering::Equal)?;

        if buy.price <= 0.0 {
            debug!("Skipping cluster {}: zero buy price", cluster.key);
            return None;
        }

        let spread_percent = (sell.price - buy.price) / buy.price * 100.0;
        let profit_margin = spread_percent - self.fee_estimate_percent;

        if profit_margin <= 0.0 {
            debug!(
                "Cluster {} spread {:.2}% does not cover fees",
                cluster.key, spread_percent
            );
            return None;
        }

        Some(PricedSpread {
            buy_quote: buy.clone(),
            sell_quote: sell.clone(),
            spread_percent,
            profit_margin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quote::fixtures::quote;
    use crate::models::{Outcome, Platform};

    fn cluster(quotes: Vec<Quote>) -> EventCluster {
        EventCluster {
            key: "bitcoin_reach_YES".to_string(),
            outcome: Outcome::Yes,
            quotes,
            match_confidence: 80.0,
            matched_keywords: Vec::new(),
        }
    }

    const Q: &str = "Will Bitcoin reach 100k?";

    #[test]
    fn test_spread_and_margin() {
        let calc = ArbitrageCalculator::new(1.0);
        let c = cluster(vec![
            quote(Platform::Kalshi, Q, Outcome::Yes, 0.78),
            quote(Platform::Polymarket, Q, Outcome::Yes, 0.75),
        ]);

        let spread = calc.calculate(&c).unwrap();
        assert_eq!(spread.buy_quote.platform, Platform::Polymarket);
        assert_eq!(spread.sell_quote.platform, Platform::Kalshi);
        assert!((spread.spread_percent - 4.0).abs() < 1e-9);
        assert!((spread.profit_margin - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_margin_below_fee_is_dropped() {
        let calc = ArbitrageCalculator::new(1.0);
        let c = cluster(vec![
            quote(Platform::Kalshi, Q, Outcome::Yes, 0.502),
            quote(Platform::Polymarket, Q, Outcome::Yes, 0.50),
        ]);

        assert!(calc.calculate(&c).is_none());
    }

    #[test]
    fn test_equal_prices_yield_nothing() {
        let calc = ArbitrageCalculator::new(0.0);
        let c = cluster(vec![
            quote(Platform::Kalshi, Q, Outcome::Yes, 0.5),
            quote(Platform::Polymarket, Q, Outcome::Yes, 0.5),
        ]);

        assert!(calc.calculate(&c).is_none());
    }

    #[test]
    fn test_ties_break_by_platform_order() {
        let calc = ArbitrageCalculator::new(1.0);
        let c = cluster(vec![
            quote(Platform::PredictIt, Q, Outcome::Yes, 0.40),
            quote(Platform::Manifold, Q, Outcome::Yes, 0.60),
            quote(Platform::Kalshi, Q, Outcome::Yes, 0.40),
            quote(Platform::Polymarket, Q, Outcome::Yes, 0.60),
        ]);

        let spread = calc.calculate(&c).unwrap();
        assert_eq!(spread.buy_quote.platform, Platform::Kalshi);
        assert_eq!(spread.sell_quote.platform, Platform::Polymarket);
    }

    #[test]
    fn test_wider_gap_increases_margin() {
        let calc = ArbitrageCalculator::new(1.0);
        let narrow = calc
            .calculate(&cluster(vec![
                quote(Platform::Kalshi, Q, Outcome::Yes, 0.50),
                quote(Platform::Polymarket, Q, Outcome::Yes, 0.55),
            ]))
            .unwrap();
        let wide = calc
            .calculate(&cluster(vec![
                quote(Platform::Kalshi, Q, Outcome::Yes, 0.50),
                quote(Platform::Polymarket, Q, Outcome::Yes, 0.60),
            ]))
            .unwrap();

        assert!(wide.profit_margin > narrow.profit_margin);
        assert!((narrow.profit_margin - (narrow.spread_percent - 1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_zero_buy_price_is_skipped() {
        let calc = ArbitrageCalculator::new(1.0);
        let c = cluster(vec![
            quote(Platform::Kalshi, Q, Outcome::Yes, 0.0),
            quote(Platform::Polymarket, Q, Outcome::Yes, 0.3),
        ]);

        assert!(calc.calculate(&c).is_none());
    }
}
