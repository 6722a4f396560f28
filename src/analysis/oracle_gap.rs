use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::matching::event_matcher::{is_date_token, is_numeric_token};
use crate::matching::{normalize, Vocabulary};
use crate::models::{OraclePrice, OracleSignal, Outcome, Quote};

/// Signals at or below this margin are not reported
pub const MIN_ORACLE_MARGIN: f64 = 3.0;

/// Share of the time window assumed to remain until resolution
const TIME_FACTOR: f64 = 0.9;

/// Compares single-asset price-target markets against oracle spot prices
pub struct OracleGapScanner {
    vocabulary: Arc<Vocabulary>,
}

impl OracleGapScanner {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    /// Asset symbol and price target named in a question
    ///
    /// The target is the largest amount mentioned, so day-of-month numbers
    /// never shadow the price level.
    pub fn extract_target(&self, question: &str) -> Option<(String, f64)> {
        let normalized = normalize(question);
        let words: Vec<&str> = normalized.split_whitespace().collect();

        let symbol = words.iter().find_map(|w| self.vocabulary.asset_for(w))?;
        let target = words
            .iter()
            .filter_map(|w| parse_amount(w))
            .reduce(f64::max)?;

        Some((symbol.to_string(), target))
    }

    /// Signals for YES quotes whose asset has an oracle price
    pub fn scan(
        &self,
        quotes: &[Quote],
        prices: &HashMap<String, OraclePrice>,
        now: DateTime<Utc>,
    ) -> Vec<OracleSignal> {
        let mut signals = Vec::new();

        for quote in quotes.iter().filter(|q| q.outcome == Outcome::Yes) {
            let Some((symbol, target)) = self.extract_target(&quote.question) else {
                continue;
            };
            let Some(oracle) = prices.get(&symbol) else {
                continue;
            };

            let implied_price = target * (1.0 - quote.odds_percent / 100.0 * TIME_FACTOR);
            if implied_price <= 0.0 {
                continue;
            }

            let profit_margin = (oracle.price - implied_price) / implied_price * 100.0;
            if profit_margin <= MIN_ORACLE_MARGIN {
                debug!(
                    "{} oracle margin {:.2}% below threshold",
                    quote.event_id, profit_margin
                );
                continue;
            }

            signals.push(OracleSignal {
                event_id: quote.event_id.clone(),
                question: quote.question.clone(),
                symbol,
                market_odds: quote.odds_percent,
                target_price: target,
                oracle_price: oracle.price,
                implied_price,
                profit_margin,
                confidence: signal_confidence(quote.volume, profit_margin, oracle),
                detected_at: now,
            });
        }

        signals
    }
}

/// Heuristic confidence from volume, margin size, and oracle precision
pub fn signal_confidence(volume: f64, profit_margin: f64, oracle: &OraclePrice) -> f64 {
    let mut confidence: f64 = 50.0;

    if volume > 1_000_000.0 {
        confidence += 20.0;
    } else if volume > 100_000.0 {
        confidence += 10.0;
    }

    if profit_margin > 10.0 {
        confidence += 30.0;
    } else if profit_margin > 5.0 {
        confidence += 20.0;
    } else if profit_margin > 3.0 {
        confidence += 10.0;
    }

    if oracle.price > 0.0 {
        let ratio = oracle.confidence / oracle.price;
        if ratio < 0.001 {
            confidence += 15.0;
        } else if ratio < 0.01 {
            confidence += 10.0;
        } else if ratio > 0.05 {
            confidence -= 10.0;
        }
    }

    confidence.clamp(0.0, 100.0)
}

/// Dollar amount of a normalized word: "100k", "2m", or a plain non-year number
fn parse_amount(word: &str) -> Option<f64> {
    if is_numeric_token(word) {
        let (digits, suffix) = word.split_at(word.len() - 1);
        let multiplier = match suffix {
            "k" => 1e3,
            "m" => 1e6,
            _ => 1e9,
        };
        return digits.parse::<f64>().ok().map(|v| v * multiplier);
    }

    if word.chars().all(|c| c.is_ascii_digit()) && !is_date_token(word) {
        return word.parse::<f64>().ok().filter(|v| *v > 0.0);
    }

    None
}
