use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::error::ValidationError;

/// Benchmark constants for the return analyzer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkConfig {
    /// Long-run equity benchmark, annualized percent
    pub base: f64,

    /// Premium an arbitrage must earn over `base`, annualized percent
    pub premium: f64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            base: 12.8,
            premium: 8.0,
        }
    }
}

/// Parameters of a detection pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Estimated round-trip fees, in percent of the buy price
    pub fee_estimate_percent: f64,

    pub benchmark: BenchmarkConfig,

    /// Opportunities scoring below this are dropped by the ranker
    pub min_risk_adjusted_score: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_estimate_percent: 1.0,
            benchmark: BenchmarkConfig::default(),
            min_risk_adjusted_score: 15.0,
        }
    }
}

impl EngineConfig {
    /// Reject malformed parameters instead of clamping them
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_non_negative(self.fee_estimate_percent) {
            return Err(ValidationError::NegativeFee(self.fee_estimate_percent));
        }
        if !is_non_negative(self.min_risk_adjusted_score) {
            return Err(ValidationError::NegativeMinScore(self.min_risk_adjusted_score));
        }
        if !is_non_negative(self.benchmark.base) {
            return Err(ValidationError::NegativeBenchmark {
                field: "base",
                value: self.benchmark.base,
            });
        }
        if !is_non_negative(self.benchmark.premium) {
            return Err(ValidationError::NegativeBenchmark {
                field: "premium",
                value: self.benchmark.premium,
            });
        }
        Ok(())
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Polymarket Gamma API URL
    pub polymarket_api_url: String,

    /// Whether to poll Polymarket at all
    pub polymarket_enabled: bool,

    /// JSON quote files served as static feeds
    pub static_feeds: Vec<PathBuf>,

    /// Interval in milliseconds between detection passes
    pub monitor_interval_ms: u64,

    /// Deliver empty results to the callback too
    pub emit_empty_results: bool,

    /// Per-request timeout for feed adapters, in seconds
    pub adapter_timeout_secs: u64,

    /// Optional vocabulary override
    pub vocabulary_path: PathBuf,

    pub engine: EngineConfig,

    /// Pyth Hermes API URL
    pub pyth_api_url: String,

    /// Assets checked by the oracle scanner; empty disables it
    pub oracle_assets: Vec<String>,

    /// Oldest acceptable oracle price, in seconds
    pub oracle_max_age_secs: i64,

    /// Interval in seconds for the oracle scanner
    pub oracle_scan_interval: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let engine = EngineConfig {
            fee_estimate_percent: parse_var("FEE_ESTIMATE_PERCENT", "1.0")?,
            benchmark: BenchmarkConfig {
                base: parse_var("BENCHMARK_BASE", "12.8")?,
                premium: parse_var("BENCHMARK_PREMIUM", "8.0")?,
            },
            min_risk_adjusted_score: parse_var("MIN_RISK_ADJUSTED_SCORE", "15.0")?,
        };

        Ok(Config {
            polymarket_api_url: env::var("POLYMARKET_API_URL")
                .unwrap_or_else(|_| "https://gamma-api.polymarket.com".to_string()),

            polymarket_enabled: parse_var("POLYMARKET_ENABLED", "true")?,

            static_feeds: list_var("STATIC_FEEDS")
                .into_iter()
                .map(PathBuf::from)
                .collect(),

            monitor_interval_ms: parse_var("MONITOR_INTERVAL_MS", "30000")?,

            emit_empty_results: parse_var("EMIT_EMPTY_RESULTS", "false")?,

            adapter_timeout_secs: parse_var("ADAPTER_TIMEOUT_SECS", "10")?,

            vocabulary_path: env::var("VOCABULARY_PATH")
                .unwrap_or_else(|_| "data/vocabulary.json".to_string())
                .into(),

            engine,

            pyth_api_url: env::var("PYTH_API_URL")
                .unwrap_or_else(|_| "https://hermes.pyth.network".to_string()),

            oracle_assets: list_var("ORACLE_ASSETS")
                .into_iter()
                .map(|s| s.to_uppercase())
                .collect(),

            oracle_max_age_secs: parse_var("ORACLE_MAX_AGE_SECS", "60")?,

            oracle_scan_interval: parse_var("ORACLE_SCAN_INTERVAL", "30")?,
        })
    }

    /// Check everything the engine and workers will rely on at startup
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;

        if self.monitor_interval_ms == 0 {
            return Err(ValidationError::ZeroInterval);
        }
        if !self.oracle_assets.is_empty() && self.oracle_max_age_secs <= 0 {
            return Err(ValidationError::ZeroOracleMaxAge);
        }
        if !self.polymarket_enabled && self.static_feeds.is_empty() {
            return Err(ValidationError::NoAdapters);
        }
        Ok(())
    }
}

/// False for negatives and NaN
fn is_non_negative(value: f64) -> bool {
    value >= 0.0
}

fn parse_var<T>(name: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .trim()
        .parse()
        .with_context(|| format!("{} must be a valid {}", name, std::any::type_name::<T>()))
}

/// Comma-separated variable, empty entries removed
fn list_var(name: &str) -> Vec<String> {
    env::var(name)
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
