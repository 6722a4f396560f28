pub mod monitor;
pub mod oracle_scanner;
pub mod publisher;

pub use monitor::{start_monitoring, MonitorHandle, MonitorState, MonitorStats, MonitoringScheduler};
pub use oracle_scanner::OracleScannerWorker;
pub use publisher::MessagePublisherWorker;
