use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Opportunity, OracleSignal};

/// Outbound message handed to downstream consumers, one variant per kind
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineMessage {
    /// A monitoring pass produced ranked opportunities
    OpportunitiesDetected {
        timestamp: DateTime<Utc>,
        opportunities: Vec<Opportunity>,
    },
    /// A monitoring pass was aborted
    PassFailed {
        timestamp: DateTime<Utc>,
        error: String,
    },
    /// The oracle scanner found mispriced single-asset markets
    OracleSignals {
        timestamp: DateTime<Utc>,
        signals: Vec<OracleSignal>,
    },
}

impl EngineMessage {
    pub fn opportunities(opportunities: Vec<Opportunity>) -> Self {
        EngineMessage::OpportunitiesDetected {
            timestamp: Utc::now(),
            opportunities,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        EngineMessage::PassFailed {
            timestamp: Utc::now(),
            error: error.to_string(),
        }
    }

    pub fn oracle(signals: Vec<OracleSignal>) -> Self {
        EngineMessage::OracleSignals {
            timestamp: Utc::now(),
            signals,
        }
    }

    /// Single-line JSON rendering
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
