//! Recalculation Scheduler
//!
//! Runs the batch orchestrator at a configurable interval. The engine
//! itself never decides when to run — this is the external clock that
//! drives it. Interval precedence: `TANKWATCH_RECALC_INTERVAL_SECS` env
//! var > `batch.interval_secs` TOML > 3600 (hourly).

use crate::batch::RecalcOrchestrator;
use crate::config::BatchConfig;
use crate::providers::{ForecastSink, ReadingSource, TankContextSource, TankDirectory};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Environment variable overriding the recalculation interval.
pub const RECALC_INTERVAL_ENV: &str = "TANKWATCH_RECALC_INTERVAL_SECS";

/// Resolve the recalculation interval in seconds.
pub fn interval_secs(config: &BatchConfig) -> u64 {
    std::env::var(RECALC_INTERVAL_ENV)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(config.interval_secs)
}

/// Interval scheduler for batch forecast recalculation.
pub struct RecalcScheduler {
    interval: Duration,
}

impl RecalcScheduler {
    /// Create a scheduler from config (honoring the env override).
    pub fn from_config(config: &BatchConfig) -> Self {
        let secs = interval_secs(config);
        info!(
            interval_secs = secs,
            "recalc scheduler created (env: {RECALC_INTERVAL_ENV})"
        );
        Self {
            interval: Duration::from_secs(secs.max(1)),
        }
    }

    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Spawn the scheduling loop. Each tick runs one full batch; the token
    /// both stops the loop and is forwarded to the orchestrator so an
    /// in-flight batch stops dispatching new tanks.
    pub fn spawn<S, K>(
        self,
        orchestrator: Arc<RecalcOrchestrator<S, K>>,
        cancel: CancellationToken,
    ) -> JoinHandle<()>
    where
        S: ReadingSource + TankContextSource + TankDirectory + 'static,
        K: ForecastSink + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        match orchestrator.recalculate_all(cancel.clone()).await {
                            Ok(summary) => info!(
                                processed = summary.processed,
                                updated = summary.updated,
                                failed = summary.failed,
                                "scheduled recalculation finished"
                            ),
                            Err(err) => warn!(
                                error = format!("{err:#}"),
                                "scheduled recalculation failed"
                            ),
                        }
                    }
                }
            }
            info!("recalc scheduler stopped");
        })
    }
}
