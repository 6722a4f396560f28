use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;
use tracing::{error, info, warn};

use crate::engine::DetectionEngine;
use crate::models::EngineMessage;

/// Worker that periodically compares price-target markets with oracle prices
pub struct OracleScannerWorker {
    engine: Arc<DetectionEngine>,
    message_tx: mpsc::Sender<EngineMessage>,
    scan_interval: Duration,
}

impl OracleScannerWorker {
    pub fn new(
        engine: Arc<DetectionEngine>,
        message_tx: mpsc::Sender<EngineMessage>,
        scan_interval_secs: u64,
    ) -> Self {
        Self {
            engine,
            message_tx,
            scan_interval: Duration::from_secs(scan_interval_secs.max(1)),
        }
    }

    /// Run the worker loop until the message channel closes
    pub async fn run(&self) {
        info!("Oracle scanner started (interval: {:?})", self.scan_interval);

        let mut interval = time::interval(self.scan_interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            if !self.scan().await {
                break;
            }
        }

        warn!("Oracle scanner channel closed");
    }

    /// One scan; returns false once nobody is listening
    async fn scan(&self) -> bool {
        match self.engine.detect_oracle_signals().await {
            Ok(signals) if signals.is_empty() => true,
            Ok(signals) => {
                for signal in &signals {
                    info!(
                        "Oracle gap: {} {} target ${:.0} vs oracle ${:.2} (margin {:.1}%, confidence {:.0})",
                        signal.symbol,
                        signal.event_id,
                        signal.target_price,
                        signal.oracle_price,
                        signal.profit_margin,
                        signal.confidence
                    );
                }
                self.message_tx
                    .send(EngineMessage::oracle(signals))
                    .await
                    .is_ok()
            }
            Err(e) => {
                error!("Oracle scan failed: {}", e);
                warn!("Will retry on next interval");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FeedAdapter, StaticFeed};
    use crate::config::EngineConfig;
    use crate::engine::test_feeds::StubOracle;
    use crate::matching::Vocabulary;
    use crate::models::quote::fixtures::quote;
    use crate::models::{Outcome, Platform};

    fn engine(age_secs: i64) -> Arc<DetectionEngine> {
        let feed: Arc<dyn FeedAdapter> = Arc::new(StaticFeed::new(
            Platform::Polymarket,
            vec![quote(
                Platform::Polymarket,
                "Will BTC hit $120,000 by December 2025?",
                Outcome::Yes,
                0.75,
            )],
        ));
        let oracle = Arc::new(StubOracle {
            price: 98_000.0,
            age_secs,
            max_age_secs: 60,
        });

        Arc::new(
            DetectionEngine::new(
                EngineConfig::default(),
                Arc::new(Vocabulary::builtin()),
                vec![feed],
            )
            .unwrap()
            .with_oracle(oracle, vec!["BTC".to_string()]),
        )
    }

    #[tokio::test]
    async fn test_scan_publishes_signals() {
        let (tx, mut rx) = mpsc::channel(4);
        let worker = OracleScannerWorker::new(engine(5), tx, 30);

        assert!(worker.scan().await);

        match rx.try_recv().unwrap() {
            EngineMessage::OracleSignals { signals, .. } => {
                assert_eq!(signals.len(), 1);
                assert_eq!(signals[0].symbol, "BTC");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stale_price_publishes_nothing() {
        let (tx, mut rx) = mpsc::channel(4);
        let worker = OracleScannerWorker::new(engine(600), tx, 30);

        assert!(worker.scan().await);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_channel_stops_worker() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let worker = OracleScannerWorker::new(engine(5), tx, 30);

        assert!(!worker.scan().await);
    }
}
