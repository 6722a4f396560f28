use crate::error::ValidationError;
use crate::models::{Opportunity, Platform};

/// Post-hoc filters a caller applies to a ranked opportunity list
#[derive(Debug, Clone, Default)]
pub struct OpportunityQuery {
    /// Minimum spread, in percent
    pub min_spread: Option<f64>,

    /// Minimum match confidence
    pub min_confidence: Option<f64>,

    /// Maximum number of results
    pub limit: Option<usize>,

    /// Both legs must trade on one of these platforms
    pub platforms: Option<Vec<Platform>>,

    /// Case-insensitive substring of the question (e.g., "election")
    pub event_type: Option<String>,
}

impl OpportunityQuery {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("min_spread", self.min_spread),
            ("min_confidence", self.min_confidence),
        ] {
            if let Some(value) = value {
                if value.is_nan() || value < 0.0 {
                    return Err(ValidationError::NegativeFilter { field, value });
                }
            }
        }
        Ok(())
    }

    /// Filter `ranked`, preserving its order
    pub fn apply(&self, ranked: &[Opportunity]) -> Result<Vec<Opportunity>, ValidationError> {
        self.validate()?;

        let event_type = self.event_type.as_ref().map(|t| t.to_lowercase());

        let filtered = ranked
            .iter()
            .filter(|o| self.min_spread.map_or(true, |min| o.spread_percent >= min))
            .filter(|o| self.min_confidence.map_or(true, |min| o.match_confidence >= min))
            .filter(|o| {
                self.platforms.as_ref().map_or(true, |allowed| {
                    allowed.contains(&o.buy_quote.platform) && allowed.contains(&o.sell_quote.platform)
                })
            })
            .filter(|o| {
                event_type
                    .as_ref()
                    .map_or(true, |t| o.question.to_lowercase().contains(t.as_str()))
            })
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(filtered)
    }
}
