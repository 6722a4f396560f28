use tracing::debug;

use crate::models::Opportunity;

/// Default floor for `risk_adjusted_score`
pub const DEFAULT_MIN_RISK_ADJUSTED_SCORE: f64 = 15.0;

/// Drop opportunities that miss the benchmark or the score floor, best first
///
/// Ties on score go to the earlier detection, then to the lower id.
pub fn rank(opportunities: Vec<Opportunity>, min_risk_adjusted_score: f64) -> Vec<Opportunity> {
    let total = opportunities.len();

    let mut ranked: Vec<Opportunity> = opportunities
        .into_iter()
        .filter(|o| {
            let analysis = &o.return_analysis;
            analysis.beats_benchmark && analysis.risk_adjusted_score >= min_risk_adjusted_score
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.return_analysis
            .risk_adjusted_score
            .total_cmp(&a.return_analysis.risk_adjusted_score)
            .then_with(|| a.detected_at.cmp(&b.detected_at))
            .then_with(|| a.id.cmp(&b.id))
    });

    debug!("Ranked {} of {} opportunities", ranked.len(), total);
    ranked
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Utc};

    use crate::models::quote::fixtures::quote;
    use crate::models::{
        Opportunity, Outcome, Platform, Recommendation, ReturnAnalysis, RiskAssessment, TimeBucket,
    };

    pub fn opportunity(
        id: &str,
        score: f64,
        beats_benchmark: bool,
        detected_at: DateTime<Utc>,
    ) -> Opportunity {
        let question = format!("Will {} happen?", id);
        Opportunity {
            id: id.to_string(),
            question: question.clone(),
            buy_quote: quote(Platform::Polymarket, &question, Outcome::Yes, 0.40),
            sell_quote: quote(Platform::Kalshi, &question, Outcome::Yes, 0.48),
            spread_percent: 20.0,
            profit_margin: 19.0,
            match_confidence: 80.0,
            matched_keywords: Vec::new(),
            return_analysis: ReturnAnalysis {
                raw_return: 19.0,
                days_to_resolution: 30,
                annualized_return: score,
                benchmark_threshold: 50.0,
                beats_benchmark,
                risk_adjusted_score: score,
                time_bucket: TimeBucket::Short,
            },
            risk: RiskAssessment {
                risk_score: 0.0,
                recommendation: Recommendation::Monitor,
                reasoning: Vec::new(),
            },
            suggested_stake_fraction: 0.0,
            detected_at,
        }
    }
}
