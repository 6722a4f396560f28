use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::analysis::sizing::kelly_fraction;
use crate::analysis::{rank, ArbitrageCalculator, OracleGapScanner, ReturnAnalyzer, RiskAssessor};
use crate::api::{FeedAdapter, PriceOracle};
use crate::config::EngineConfig;
use crate::error::{DetectionError, ValidationError};
use crate::matching::{EventMatcher, Vocabulary};
use crate::models::{Opportunity, OraclePrice, OracleSignal, Quote};

/// Oracle wiring for the single-asset scan
struct OracleSetup {
    oracle: Arc<dyn PriceOracle>,
    assets: Vec<String>,
    scanner: OracleGapScanner,
}

/// Runs the fetch -> match -> calculate -> analyze -> rank pipeline
pub struct DetectionEngine {
    config: EngineConfig,
    adapters: Vec<Arc<dyn FeedAdapter>>,
    matcher: EventMatcher,
    calculator: ArbitrageCalculator,
    analyzer: ReturnAnalyzer,
    assessor: RiskAssessor,
    oracle: Option<OracleSetup>,
    vocabulary: Arc<Vocabulary>,
}

impl DetectionEngine {
    /// Build an engine; rejects invalid parameters and an empty adapter list
    pub fn new(
        config: EngineConfig,
        vocabulary: Arc<Vocabulary>,
        adapters: Vec<Arc<dyn FeedAdapter>>,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        if adapters.is_empty() {
            return Err(ValidationError::NoAdapters);
        }

        Ok(Self {
            config,
            adapters,
            matcher: EventMatcher::new(Arc::clone(&vocabulary)),
            calculator: ArbitrageCalculator::new(config.fee_estimate_percent),
            analyzer: ReturnAnalyzer::new(config.benchmark),
            assessor: RiskAssessor::new(Arc::clone(&vocabulary)),
            oracle: None,
            vocabulary,
        })
    }

    /// Enable the single-asset oracle scan for `assets`
    pub fn with_oracle(mut self, oracle: Arc<dyn PriceOracle>, assets: Vec<String>) -> Self {
        self.oracle = Some(OracleSetup {
            oracle,
            assets,
            scanner: OracleGapScanner::new(Arc::clone(&self.vocabulary)),
        });
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    /// One full detection pass: ranked opportunities, or the first failure
    pub async fn detect_opportunities(&self) -> Result<Vec<Opportunity>, DetectionError> {
        self.config.validate()?;

        let quotes = self.fetch_all_quotes().await?;
        let ranked = self.detect_from_quotes(&quotes, Utc::now());

        info!(
            "Detection pass complete: {} quotes, {} ranked opportunities",
            quotes.len(),
            ranked.len()
        );

        Ok(ranked)
    }

    /// Fan out to every adapter; the first failure aborts the whole fetch
    pub async fn fetch_all_quotes(&self) -> Result<Vec<Quote>, DetectionError> {
        let batches = try_join_all(self.adapters.iter().map(|adapter| async move {
            let quotes = adapter.get_all_quotes().await?;
            debug!("{} returned {} quotes", adapter.platform(), quotes.len());
            Ok::<_, DetectionError>(quotes)
        }))
        .await?;

        let mut quotes = Vec::new();
        for quote in batches.into_iter().flatten() {
            if quote.is_well_formed() {
                quotes.push(quote);
            } else {
                warn!(
                    "Discarding malformed {} quote {} (price {}, odds {})",
                    quote.platform, quote.event_id, quote.price, quote.odds_percent
                );
            }
        }

        Ok(quotes)
    }

    /// Pure part of a pass over an already-fetched quote set
    pub fn detect_from_quotes(&self, quotes: &[Quote], now: DateTime<Utc>) -> Vec<Opportunity> {
        let clusters = self.matcher.match_quotes(quotes);

        let opportunities: Vec<Opportunity> = clusters
            .iter()
            .filter_map(|cluster| {
                let spread = self.calculator.calculate(cluster)?;

                let resolution_date = spread
                    .buy_quote
                    .resolution_date
                    .max(spread.sell_quote.resolution_date);

                let return_analysis = self.analyzer.analyze_at(
                    spread.profit_margin,
                    resolution_date,
                    cluster.match_confidence,
                    now,
                );

                let risk = self.assessor.assess(
                    &spread.buy_quote.question,
                    spread.profit_margin,
                    cluster.match_confidence,
                );

                debug!(
                    "{} | spread {:.2}% | margin {:.2}% | APY {:.1}% vs {:.1}% | score {:.1} | risk {:.0} {}",
                    cluster.key,
                    spread.spread_percent,
                    spread.profit_margin,
                    return_analysis.annualized_return,
                    return_analysis.benchmark_threshold,
                    return_analysis.risk_adjusted_score,
                    risk.risk_score,
                    risk.recommendation
                );

                Some(Opportunity {
                    id: format!(
                        "{}:{}->{}",
                        cluster.key, spread.buy_quote.platform, spread.sell_quote.platform
                    ),
                    question: spread.buy_quote.question.clone(),
                    suggested_stake_fraction: kelly_fraction(
                        spread.profit_margin,
                        cluster.match_confidence,
                        risk.risk_score,
                    ),
                    spread_percent: spread.spread_percent,
                    profit_margin: spread.profit_margin,
                    match_confidence: cluster.match_confidence,
                    matched_keywords: cluster.matched_keywords.clone(),
                    return_analysis,
                    risk,
                    buy_quote: spread.buy_quote,
                    sell_quote: spread.sell_quote,
                    detected_at: now,
                })
            })
            .collect();

        rank(opportunities, self.config.min_risk_adjusted_score)
    }

    /// Compare price-target markets with oracle spot prices
    ///
    /// Any stale or missing oracle price aborts the scan.
    pub async fn detect_oracle_signals(&self) -> Result<Vec<OracleSignal>, DetectionError> {
        let Some(setup) = &self.oracle else {
            return Ok(Vec::new());
        };

        let (quotes, prices) = futures::try_join!(
            self.fetch_all_quotes(),
            try_join_all(
                setup
                    .assets
                    .iter()
                    .map(|symbol| setup.oracle.fetch_price(symbol))
            )
        )?;

        let prices: HashMap<String, OraclePrice> = prices
            .into_iter()
            .map(|p| (p.symbol.clone(), p))
            .collect();

        let signals = setup.scanner.scan(&quotes, &prices, Utc::now());
        info!("Oracle scan complete: {} signals", signals.len());

        Ok(signals)
    }
}
