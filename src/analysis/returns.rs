use chrono::{DateTime, Utc};

use crate::config::BenchmarkConfig;
use crate::models::{ReturnAnalysis, TimeBucket};

const SECS_PER_DAY: i64 = 86_400;
const DAYS_PER_YEAR: f64 = 365.0;

/// Converts single-period margins into annualized, benchmarked, risk-adjusted returns
#[derive(Debug, Clone)]
pub struct ReturnAnalyzer {
    benchmark: BenchmarkConfig,
}

impl ReturnAnalyzer {
    pub fn new(benchmark: BenchmarkConfig) -> Self {
        Self { benchmark }
    }

    /// Analyze against the current wall clock
    pub fn analyze(
        &self,
        profit_margin: f64,
        resolution_date: DateTime<Utc>,
        match_confidence: f64,
    ) -> ReturnAnalysis {
        self.analyze_at(profit_margin, resolution_date, match_confidence, Utc::now())
    }

    pub fn analyze_at(
        &self,
        profit_margin: f64,
        resolution_date: DateTime<Utc>,
        match_confidence: f64,
        now: DateTime<Utc>,
    ) -> ReturnAnalysis {
        let days = days_to_resolution(resolution_date, now);
        let annualized_return = annualized_return(profit_margin, days);
        let benchmark_threshold = self.benchmark_threshold(days);
        let risk_adjusted_score =
            annualized_return * (match_confidence / 100.0) * liquidity_penalty(days);

        ReturnAnalysis {
            raw_return: profit_margin,
            days_to_resolution: days,
            annualized_return,
            benchmark_threshold,
            beats_benchmark: annualized_return >= benchmark_threshold,
            risk_adjusted_score,
            time_bucket: TimeBucket::from_days(days),
        }
    }

    /// Minimum annualized return that justifies locking capital for `days`
    ///
    /// Short windows demand a much higher bar since their annualized figure
    /// amplifies pricing noise.
    pub fn benchmark_threshold(&self, days: i64) -> f64 {
        let required = self.benchmark.base + self.benchmark.premium;

        if days <= 30 {
            required.max(50.0)
        } else if days <= 180 {
            required.max(25.0)
        } else if days <= 365 {
            required
        } else {
            self.benchmark.base + 5.0
        }
    }
}

/// Whole days until resolution, rounded up, never below one
pub fn days_to_resolution(resolution_date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (resolution_date - now).num_seconds();
    let days = if secs > 0 {
        (secs + SECS_PER_DAY - 1) / SECS_PER_DAY
    } else {
        0
    };
    days.max(1)
}

/// Compound a single-period percent return to a 365-day basis
///
/// Saturates at `f64::MAX` when compounding overflows, so results stay
/// finite and serializable.
pub fn annualized_return(profit_margin: f64, days: i64) -> f64 {
    let periods = DAYS_PER_YEAR / days.max(1) as f64;
    let annualized = ((1.0 + profit_margin / 100.0).powf(periods) - 1.0) * 100.0;

    if annualized.is_finite() {
        annualized
    } else if annualized.is_nan() {
        0.0
    } else {
        annualized.signum() * f64::MAX
    }
}

/// Discount for capital locked past a typical rebalancing horizon
pub fn liquidity_penalty(days: i64) -> f64 {
    if days > 365 {
        0.8
    } else if days > 180 {
        0.9
    } else {
        1.0
    }
}
