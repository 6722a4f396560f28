pub mod message;
pub mod opportunity;
pub mod oracle;
pub mod quote;

pub use message::EngineMessage;
pub use opportunity::{Opportunity, Recommendation, ReturnAnalysis, RiskAssessment, TimeBucket};
pub use oracle::{OraclePrice, OracleSignal};
pub use quote::{EventCluster, Outcome, Platform, Quote};
