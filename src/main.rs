use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spread_scout::api::{FeedAdapter, PolymarketFeed, PythOracle, StaticFeed};
use spread_scout::config::Config;
use spread_scout::matching::Vocabulary;
use spread_scout::models::EngineMessage;
use spread_scout::workers::{MessagePublisherWorker, MonitoringScheduler, OracleScannerWorker};
use spread_scout::DetectionEngine;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spread_scout=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting spread-scout");

    // Load configuration
    let config = Config::from_env()?;
    config.validate().context("Invalid configuration")?;
    info!("Configuration loaded");

    let vocabulary = Arc::new(load_vocabulary(&config.vocabulary_path)?);
    info!("Vocabulary initialized");

    let adapters = build_adapters(&config)?;
    info!("{} feed adapters initialized", adapters.len());

    let mut engine = DetectionEngine::new(config.engine, Arc::clone(&vocabulary), adapters)?;

    if !config.oracle_assets.is_empty() {
        let oracle = PythOracle::new(
            &config.pyth_api_url,
            Duration::from_secs(config.adapter_timeout_secs),
            config.oracle_max_age_secs,
        )?;

        let (assets, unsupported): (Vec<String>, Vec<String>) = config
            .oracle_assets
            .iter()
            .cloned()
            .partition(|symbol| oracle.supports(symbol));
        for symbol in &unsupported {
            warn!("No Pyth feed for {}, skipping", symbol);
        }

        if !assets.is_empty() {
            info!("Oracle scan enabled for {:?}", assets);
            engine = engine.with_oracle(Arc::new(oracle), assets);
        }
    }

    let engine = Arc::new(engine);
    info!(
        "Detection engine ready (fee {:.2}%, min score {:.1}, benchmark {:.1}% + {:.1}%)",
        engine.config().fee_estimate_percent,
        engine.config().min_risk_adjusted_score,
        engine.config().benchmark.base,
        engine.config().benchmark.premium
    );

    // Channel for outbound messages
    let (message_tx, message_rx) = mpsc::channel(100);

    let publisher = MessagePublisherWorker::new(message_rx, tokio::io::stdout());

    let result_tx = message_tx.clone();
    let failure_tx = message_tx.clone();
    let monitor = MonitoringScheduler::new(Arc::clone(&engine), config.monitor_interval_ms)?
        .emit_empty(config.emit_empty_results)
        .on_failure(move |e| {
            if failure_tx.try_send(EngineMessage::failure(e)).is_err() {
                warn!("Message channel full, dropping failure report");
            }
        })
        .start(move |ranked| {
            for opportunity in &ranked {
                info!(
                    "Opportunity {}: buy {} @ {:.2}, sell {} @ {:.2}, margin {:.2}%, score {:.1}, {}",
                    opportunity.id,
                    opportunity.buy_quote.platform,
                    opportunity.buy_quote.price,
                    opportunity.sell_quote.platform,
                    opportunity.sell_quote.price,
                    opportunity.profit_margin,
                    opportunity.return_analysis.risk_adjusted_score,
                    opportunity.risk.recommendation
                );
            }
            if result_tx.try_send(EngineMessage::opportunities(ranked)).is_err() {
                warn!("Message channel full, dropping opportunities");
            }
        });

    let oracle_handle = if engine.has_oracle() {
        let scanner =
            OracleScannerWorker::new(Arc::clone(&engine), message_tx, config.oracle_scan_interval);
        Some(tokio::spawn(async move {
            scanner.run().await;
        }))
    } else {
        drop(message_tx);
        None
    };

    let publisher_handle = tokio::spawn(async move {
        publisher.run().await;
    });

    info!("All workers started");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        result = publisher_handle => {
            error!("Message publisher exited unexpectedly: {:?}", result);
        }
    }

    let stats = monitor.stats();
    monitor.shutdown().await;
    if let Some(handle) = oracle_handle {
        handle.abort();
    }

    info!(
        "Shutting down spread-scout ({} passes, {} failed, {} ticks skipped)",
        stats.passes_started, stats.passes_failed, stats.ticks_skipped
    );
    Ok(())
}

/// Load vocabulary from JSON file or fall back to the built-in one
fn load_vocabulary(path: &Path) -> Result<Vocabulary> {
    if path.exists() {
        Vocabulary::load_from_file(path)
    } else {
        info!("No vocabulary file found, using built-in vocabulary");
        Ok(Vocabulary::builtin())
    }
}

fn build_adapters(config: &Config) -> Result<Vec<Arc<dyn FeedAdapter>>> {
    let mut adapters: Vec<Arc<dyn FeedAdapter>> = Vec::new();

    if config.polymarket_enabled {
        let feed = PolymarketFeed::new(
            &config.polymarket_api_url,
            Duration::from_secs(config.adapter_timeout_secs),
        )?;
        adapters.push(Arc::new(feed));
    }

    for path in &config.static_feeds {
        let feed = StaticFeed::load_from_file(path)?;
        info!("Loaded static {} feed from {}", feed.platform(), path.display());
        adapters.push(Arc::new(feed));
    }

    Ok(adapters)
}
