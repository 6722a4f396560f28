use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::DetectionEngine;
use crate::error::{DetectionError, ValidationError};
use crate::models::Opportunity;

type OpportunityCallback = Arc<dyn Fn(Vec<Opportunity>) + Send + Sync>;
type FailureCallback = Arc<dyn Fn(&DetectionError) + Send + Sync>;

/// Lifecycle of a monitoring loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Waiting for the next tick
    Idle,
    /// A detection pass is in flight
    Running,
    /// No further ticks will fire
    Cancelled,
}

/// Snapshot of the monitor counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub ticks: u64,
    pub ticks_skipped: u64,
    pub passes_started: u64,
    pub passes_completed: u64,
    pub passes_failed: u64,
    pub results_discarded: u64,
}

#[derive(Default)]
struct Counters {
    ticks: AtomicU64,
    ticks_skipped: AtomicU64,
    passes_started: AtomicU64,
    passes_completed: AtomicU64,
    passes_failed: AtomicU64,
    results_discarded: AtomicU64,
}

/// State shared between the tick loop and in-flight passes
struct Shared {
    engine: Arc<DetectionEngine>,
    running: AtomicBool,
    token: CancellationToken,
    counters: Counters,
    delivery: Mutex<()>,
    emit_empty: bool,
    on_result: OpportunityCallback,
    on_failure: Option<FailureCallback>,
}

/// Clears the running flag even if a pass panics
struct PassGuard<'a>(&'a AtomicBool);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Shared {
    async fn run_pass(&self) {
        self.counters.passes_started.fetch_add(1, Ordering::SeqCst);

        let result = {
            let _guard = PassGuard(&self.running);
            self.engine.detect_opportunities().await
        };

        self.deliver(result);
    }

    /// Hand a finished pass to the callbacks unless the monitor was cancelled
    ///
    /// Runs under the delivery lock, so `MonitorHandle::cancel` cannot
    /// return while a callback is still executing.
    fn deliver(&self, result: Result<Vec<Opportunity>, DetectionError>) {
        let _delivery = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);

        match result {
            Ok(ranked) => {
                self.counters.passes_completed.fetch_add(1, Ordering::SeqCst);

                if self.token.is_cancelled() {
                    self.counters.results_discarded.fetch_add(1, Ordering::SeqCst);
                    debug!("Monitor cancelled, discarding {} opportunities", ranked.len());
                    return;
                }

                if ranked.is_empty() && !self.emit_empty {
                    debug!("No opportunities this pass");
                    return;
                }

                (self.on_result)(ranked);
            }
            Err(e) => {
                self.counters.passes_failed.fetch_add(1, Ordering::SeqCst);
                error!("Detection pass failed: {}", e);
                warn!("Will retry on next interval");

                if let Some(on_failure) = &self.on_failure {
                    if !self.token.is_cancelled() {
                        on_failure(&e);
                    }
                }
            }
        }
    }
}

/// Runs detection passes on a timer, never more than one at a time
pub struct MonitoringScheduler {
    engine: Arc<DetectionEngine>,
    interval: Duration,
    emit_empty: bool,
    on_failure: Option<FailureCallback>,
}

impl MonitoringScheduler {
    /// Create a scheduler ticking every `interval_ms` milliseconds
    pub fn new(engine: Arc<DetectionEngine>, interval_ms: u64) -> Result<Self, ValidationError> {
        if interval_ms == 0 {
            return Err(ValidationError::ZeroInterval);
        }

        Ok(Self {
            engine,
            interval: Duration::from_millis(interval_ms),
            emit_empty: false,
            on_failure: None,
        })
    }

    /// Also deliver passes that found nothing
    pub fn emit_empty(mut self, emit_empty: bool) -> Self {
        self.emit_empty = emit_empty;
        self
    }

    /// Observe failed passes
    pub fn on_failure<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DetectionError) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(callback));
        self
    }

    /// Spawn the tick loop; `callback` receives each pass's ranked opportunities
    pub fn start<F>(self, callback: F) -> MonitorHandle
    where
        F: Fn(Vec<Opportunity>) + Send + Sync + 'static,
    {
        let token = CancellationToken::new();
        let shared = Arc::new(Shared {
            engine: self.engine,
            running: AtomicBool::new(false),
            token: token.clone(),
            counters: Counters::default(),
            delivery: Mutex::new(()),
            emit_empty: self.emit_empty,
            on_result: Arc::new(callback),
            on_failure: self.on_failure,
        });

        let period = self.interval;
        let loop_shared = Arc::clone(&shared);

        let task = tokio::spawn(async move {
            info!("Monitoring started (interval: {:?})", period);

            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = loop_shared.token.cancelled() => break,
                    _ = interval.tick() => {}
                }

                loop_shared.counters.ticks.fetch_add(1, Ordering::SeqCst);

                if loop_shared
                    .running
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    loop_shared.counters.ticks_skipped.fetch_add(1, Ordering::SeqCst);
                    debug!("Previous pass still running, skipping tick");
                    continue;
                }

                let pass_shared = Arc::clone(&loop_shared);
                tokio::spawn(async move {
                    pass_shared.run_pass().await;
                });
            }

            info!("Monitoring stopped");
        });

        MonitorHandle {
            token,
            shared,
            task,
        }
    }
}

/// Start monitoring `engine` with default options
pub fn start_monitoring<F>(
    engine: Arc<DetectionEngine>,
    callback: F,
    interval_ms: u64,
) -> Result<MonitorHandle, ValidationError>
where
    F: Fn(Vec<Opportunity>) + Send + Sync + 'static,
{
    Ok(MonitoringScheduler::new(engine, interval_ms)?.start(callback))
}

/// Controls a running monitor
pub struct MonitorHandle {
    token: CancellationToken,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Stop future ticks; an in-flight pass finishes but its result is dropped
    ///
    /// Waits for a callback that is already running, so no result is
    /// delivered after this returns. Must not be called from inside a callback.
    pub fn cancel(&self) {
        self.token.cancel();
        drop(self.shared.delivery.lock().unwrap_or_else(PoisonError::into_inner));
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn state(&self) -> MonitorState {
        if self.token.is_cancelled() {
            MonitorState::Cancelled
        } else if self.shared.running.load(Ordering::SeqCst) {
            MonitorState::Running
        } else {
            MonitorState::Idle
        }
    }

    pub fn stats(&self) -> MonitorStats {
        let c = &self.shared.counters;
        MonitorStats {
            ticks: c.ticks.load(Ordering::SeqCst),
            ticks_skipped: c.ticks_skipped.load(Ordering::SeqCst),
            passes_started: c.passes_started.load(Ordering::SeqCst),
            passes_completed: c.passes_completed.load(Ordering::SeqCst),
            passes_failed: c.passes_failed.load(Ordering::SeqCst),
            results_discarded: c.results_discarded.load(Ordering::SeqCst),
        }
    }

    /// Cancel and wait for the tick loop to exit
    pub async fn shutdown(self) {
        self.cancel();
        if let Err(e) = self.task.await {
            error!("Monitor task ended abnormally: {}", e);
        }
    }
}
