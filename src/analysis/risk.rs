use std::sync::Arc;

use crate::matching::{normalize, Vocabulary};
use crate::models::{Recommendation, RiskAssessment};

/// Margins above this look more like a pricing error than an edge
pub const SUSPICIOUS_MARGIN: f64 = 15.0;
pub const STRONG_MARGIN: f64 = 8.0;
pub const LOW_CONFIDENCE: f64 = 60.0;
pub const HIGH_CONFIDENCE: f64 = 85.0;

/// Recommendations require a risk score strictly below these
pub const EXECUTE_MAX_RISK: f64 = 70.0;
pub const MONITOR_MAX_RISK: f64 = 80.0;

/// Historical hit rate of price-target markets per asset
const ASSET_ACCURACY: &[(&str, f64)] = &[("BTC", 0.72), ("ETH", 0.68)];
const STRONG_ACCURACY: f64 = 0.7;

/// Added for any question naming a crypto asset
const CRYPTO_VOLATILITY_RISK: f64 = 15.0;

/// Scores opportunities with a fixed rule set
pub struct RiskAssessor {
    vocabulary: Arc<Vocabulary>,
}

impl RiskAssessor {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self { vocabulary }
    }

    pub fn assess(&self, question: &str, profit_margin: f64, confidence: f64) -> RiskAssessment {
        let mut reasoning = Vec::new();
        let mut risk_score = 0.0;

        if profit_margin > SUSPICIOUS_MARGIN {
            risk_score += 30.0;
            reasoning.push(format!(
                "Margin of {:.1}% is high enough to suggest a pricing error",
                profit_margin
            ));
        } else if profit_margin > STRONG_MARGIN {
            risk_score += 10.0;
            reasoning.push(format!("Strong margin of {:.1}%", profit_margin));
        } else {
            reasoning.push(format!("Moderate margin of {:.1}%", profit_margin));
        }

        if confidence < LOW_CONFIDENCE {
            risk_score += 25.0;
            reasoning.push(format!("Low match confidence ({:.1}%)", confidence));
        } else if confidence > HIGH_CONFIDENCE {
            risk_score -= 10.0;
            reasoning.push(format!("High match confidence ({:.1}%)", confidence));
        }

        let normalized = normalize(question);
        let asset = normalized
            .split_whitespace()
            .find_map(|w| self.vocabulary.asset_for(w));

        if let Some(symbol) = asset {
            if let Some((_, accuracy)) = ASSET_ACCURACY.iter().find(|(s, _)| *s == symbol) {
                if *accuracy > STRONG_ACCURACY {
                    risk_score -= 5.0;
                    reasoning.push(format!("{} markets have a strong track record", symbol));
                } else {
                    risk_score += 10.0;
                    reasoning.push(format!("{} markets have a mixed track record", symbol));
                }
            }

            risk_score += CRYPTO_VOLATILITY_RISK;
            reasoning.push(format!("{} is exposed to crypto volatility", symbol));
        }

        let recommendation = recommend(profit_margin, confidence, risk_score);
        reasoning.push(format!("Recommendation: {}", recommendation));

        RiskAssessment {
            risk_score,
            recommendation,
            reasoning,
        }
    }
}

pub fn recommend(profit_margin: f64, confidence: f64, risk_score: f64) -> Recommendation {
    if profit_margin > 5.0 && confidence > 70.0 && risk_score < EXECUTE_MAX_RISK {
        Recommendation::Execute
    } else if profit_margin > 3.0 && confidence > 60.0 && risk_score < MONITOR_MAX_RISK {
        Recommendation::Monitor
    } else {
        Recommendation::Skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessor() -> RiskAssessor {
        RiskAssessor::new(Arc::new(Vocabulary::builtin()))
    }

    const PLAIN: &str = "Will the senate pass the budget?";

    #[test]
    fn test_margin_rules() {
        let a = assessor();
        assert_eq!(a.assess(PLAIN, 15.0, 70.0).risk_score, 10.0);
        assert_eq!(a.assess(PLAIN, 15.1, 70.0).risk_score, 30.0);
        assert_eq!(a.assess(PLAIN, 8.0, 70.0).risk_score, 0.0);
        assert_eq!(a.assess(PLAIN, 8.1, 70.0).risk_score, 10.0);
    }

    #[test]
    fn test_confidence_rules() {
        let a = assessor();
        assert_eq!(a.assess(PLAIN, 4.0, 59.9).risk_score, 25.0);
        assert_eq!(a.assess(PLAIN, 4.0, 60.0).risk_score, 0.0);
        assert_eq!(a.assess(PLAIN, 4.0, 85.0).risk_score, 0.0);
        assert_eq!(a.assess(PLAIN, 4.0, 85.1).risk_score, -10.0);
    }

    #[test]
    fn test_asset_history_and_volatility() {
        let a = assessor();
        // strong history -5, volatility +15
        assert_eq!(a.assess("Will Bitcoin reach 100k?", 4.0, 70.0).risk_score, 10.0);
        // mixed history +10, volatility +15
        assert_eq!(a.assess("Will ETH flip 5k?", 4.0, 70.0).risk_score, 25.0);
        // no history entry, volatility only
        assert_eq!(a.assess("Will Solana reach 500?", 4.0, 70.0).risk_score, 15.0);
    }

    #[test]
    fn test_reasoning_ends_with_recommendation() {
        let assessment = assessor().assess("Will Bitcoin reach 100k?", 20.0, 50.0);

        // 30 margin + 25 confidence - 5 history + 15 volatility
        assert_eq!(assessment.risk_score, 65.0);
        assert_eq!(assessment.recommendation, Recommendation::Skip);
        assert_eq!(assessment.reasoning.len(), 5);
        assert_eq!(
            assessment.reasoning.last().map(String::as_str),
            Some("Recommendation: SKIP")
        );
    }

    #[test]
    fn test_recommendation_thresholds() {
        assert_eq!(recommend(5.1, 70.1, 69.9), Recommendation::Execute);
        assert_eq!(recommend(5.0, 70.1, 0.0), Recommendation::Monitor);
        assert_eq!(recommend(5.1, 70.0, 0.0), Recommendation::Monitor);
        assert_eq!(recommend(5.1, 70.1, 70.0), Recommendation::Monitor);
        assert_eq!(recommend(3.1, 60.1, 79.9), Recommendation::Monitor);
        assert_eq!(recommend(3.0, 90.0, 0.0), Recommendation::Skip);
        assert_eq!(recommend(4.0, 60.0, 0.0), Recommendation::Skip);
        assert_eq!(recommend(4.0, 65.0, 80.0), Recommendation::Skip);
    }
}
