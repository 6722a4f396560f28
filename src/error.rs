use thiserror::Error;

use crate::models::Platform;

/// Caller-supplied parameters that are rejected before a pass starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("fee estimate must be non-negative, got {0}")]
    NegativeFee(f64),

    #[error("minimum risk-adjusted score must be non-negative, got {0}")]
    NegativeMinScore(f64),

    #[error("benchmark {field} must be non-negative, got {value}")]
    NegativeBenchmark { field: &'static str, value: f64 },

    #[error("monitoring interval must be greater than zero")]
    ZeroInterval,

    #[error("at least one feed adapter is required")]
    NoAdapters,

    #[error("oracle max age must be greater than zero")]
    ZeroOracleMaxAge,

    #[error("query filter {field} must be non-negative, got {value}")]
    NegativeFilter { field: &'static str, value: f64 },
}

/// Reasons a detection pass is aborted
#[derive(Error, Debug, Clone)]
pub enum DetectionError {
    #[error("{platform} feed failed: {reason}")]
    Fetch { platform: Platform, reason: String },

    #[error("{symbol} price is stale: {age_secs}s old (max {max_age_secs}s)")]
    StalePrice {
        symbol: String,
        age_secs: i64,
        max_age_secs: i64,
    },

    #[error("oracle returned no usable price for {symbol}: {reason}")]
    Oracle { symbol: String, reason: String },

    #[error("invalid parameters: {0}")]
    Validation(#[from] ValidationError),
}

impl DetectionError {
    /// Wrap an adapter failure
    pub fn fetch(platform: Platform, err: impl std::fmt::Display) -> Self {
        DetectionError::Fetch {
            platform,
            reason: format!("{:#}", err),
        }
    }
}
