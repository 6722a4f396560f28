pub mod arbitrage;
pub mod oracle_gap;
pub mod ranker;
pub mod returns;
pub mod risk;
pub mod sizing;

pub use arbitrage::{ArbitrageCalculator, PricedSpread};
pub use oracle_gap::OracleGapScanner;
pub use ranker::rank;
pub use returns::ReturnAnalyzer;
pub use risk::RiskAssessor;
