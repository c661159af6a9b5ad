//! Batch Recalculation Orchestrator
//!
//! Recomputes forecasts for the whole tank population. Per-tank work runs
//! on a bounded worker pool sized to the external store's connection
//! budget, not to CPU count — the dominant cost is fetching each tank's
//! reading window, and the engine call itself never blocks.
//!
//! Failure isolation is the only cross-tank guarantee: a tank whose fetch
//! or persist fails is counted and logged, and the rest of the batch
//! continues. A caller-supplied cancellation token stops dispatch of new
//! tanks; in-flight tanks finish.

use crate::config::{BatchConfig, ForecastConfig};
use crate::engine::RunwayAnalyzer;
use crate::providers::{ForecastSink, ReadingSource, TankContextSource, TankDirectory};
use crate::types::ForecastResult;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Aggregate counts from one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalcSummary {
    /// Tanks dispatched into the pipeline
    pub processed: usize,
    /// Tanks whose forecast was recomputed and persisted
    pub updated: usize,
    /// Tanks that hit a fetch or persistence failure
    pub failed: usize,
}

/// Drives the full pipeline across every tank the directory supplies.
pub struct RecalcOrchestrator<S, K> {
    source: Arc<S>,
    sink: Arc<K>,
    forecast: ForecastConfig,
    batch: BatchConfig,
}

impl<S, K> RecalcOrchestrator<S, K>
where
    S: ReadingSource + TankContextSource + TankDirectory + 'static,
    K: ForecastSink + 'static,
{
    pub fn new(
        source: Arc<S>,
        sink: Arc<K>,
        forecast: ForecastConfig,
        batch: BatchConfig,
    ) -> Self {
        Self {
            source,
            sink,
            forecast,
            batch,
        }
    }

    /// Recalculate and persist forecasts for every tank.
    ///
    /// Returns aggregate counts; only the directory listing itself can fail
    /// the call. Per-tank failures are absorbed into `failed`.
    pub async fn recalculate_all(&self, cancel: CancellationToken) -> Result<RecalcSummary> {
        let tank_ids = self
            .source
            .list_tank_ids()
            .await
            .context("failed to list tanks for batch recalculation")?;

        info!(
            tanks = tank_ids.len(),
            workers = self.batch.max_concurrent_tanks,
            window_days = self.forecast.window_days,
            "starting batch recalculation"
        );

        let semaphore = Arc::new(Semaphore::new(self.batch.max_concurrent_tanks.max(1)));
        let mut workers: JoinSet<(String, Result<ForecastResult>)> = JoinSet::new();

        for tank_id in tank_ids {
            if cancel.is_cancelled() {
                warn!("cancellation requested — no further tanks dispatched");
                break;
            }

            let permit = tokio::select! {
                () = cancel.cancelled() => {
                    warn!("cancellation requested while waiting for a worker slot");
                    break;
                }
                permit = semaphore.clone().acquire_owned() => {
                    permit.context("worker pool semaphore closed")?
                }
            };

            let source = Arc::clone(&self.source);
            let sink = Arc::clone(&self.sink);
            let window_days = self.forecast.window_days;
            workers.spawn(async move {
                let _permit = permit;
                let outcome =
                    recalculate_one(source.as_ref(), sink.as_ref(), &tank_id, window_days).await;
                (tank_id, outcome)
            });
        }

        let mut summary = RecalcSummary::default();
        while let Some(joined) = workers.join_next().await {
            summary.processed += 1;
            match joined {
                Ok((tank_id, Ok(result))) => {
                    summary.updated += 1;
                    debug!(
                        tank_id = %tank_id,
                        data_points = result.data_points,
                        confidence = %result.confidence,
                        "tank forecast persisted"
                    );
                }
                Ok((tank_id, Err(err))) => {
                    summary.failed += 1;
                    warn!(tank_id = %tank_id, error = format!("{err:#}"), "tank recalculation failed");
                }
                Err(join_err) => {
                    summary.failed += 1;
                    warn!(error = %join_err, "tank recalculation task aborted");
                }
            }
        }

        info!(
            processed = summary.processed,
            updated = summary.updated,
            failed = summary.failed,
            "batch recalculation complete"
        );
        Ok(summary)
    }
}

/// Fetch, analyze, and persist one tank. Any error here becomes a per-tank
/// failure count, never a batch abort.
async fn recalculate_one<S, K>(
    source: &S,
    sink: &K,
    tank_id: &str,
    window_days: u32,
) -> Result<ForecastResult>
where
    S: ReadingSource + TankContextSource + ?Sized,
    K: ForecastSink + ?Sized,
{
    let readings = source
        .fetch_readings(tank_id, window_days)
        .await
        .with_context(|| format!("failed to fetch readings for tank {tank_id}"))?;

    let context = source
        .fetch_tank_context(tank_id)
        .await
        .with_context(|| format!("failed to fetch context for tank {tank_id}"))?;

    let result = RunwayAnalyzer::analyze(&readings, &context, window_days, Utc::now());

    sink.persist(tank_id, &result)
        .await
        .with_context(|| format!("failed to persist forecast for tank {tank_id}"))?;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::InMemoryTankStore;
    use crate::types::{TankContext, TankReading};
    use chrono::{Duration, TimeZone};

    fn linear_readings() -> Vec<TankReading> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        [80.0, 75.0, 70.0, 65.0]
            .iter()
            .enumerate()
            .map(|(i, &p)| TankReading::new(base + Duration::days(i as i64), Some(p), None))
            .collect()
    }

    fn context() -> TankContext {
        TankContext {
            capacity_volume: Some(1000.0),
            current_level_percent: Some(65.0),
            ..TankContext::default()
        }
    }

    fn store_with_tanks(n: usize) -> InMemoryTankStore {
        let mut store = InMemoryTankStore::new();
        for i in 0..n {
            store.add_tank(format!("T{i}"), linear_readings(), context());
        }
        store
    }

    #[tokio::test]
    async fn test_batch_processes_every_tank() {
        let store = Arc::new(store_with_tanks(5));
        let orchestrator = RecalcOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&store),
            ForecastConfig::default(),
            BatchConfig::default(),
        );

        let summary = orchestrator
            .recalculate_all(CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(
            summary,
            RecalcSummary {
                processed: 5,
                updated: 5,
                failed: 0
            }
        );
        assert_eq!(store.persisted().await.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_population_is_a_noop() {
        let store = Arc::new(InMemoryTankStore::new());
        let orchestrator = RecalcOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&store),
            ForecastConfig::default(),
            BatchConfig::default(),
        );
        let summary = orchestrator
            .recalculate_all(CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(summary, RecalcSummary::default());
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_dispatches_nothing() {
        let store = Arc::new(store_with_tanks(3));
        let orchestrator = RecalcOrchestrator::new(
            Arc::clone(&store),
            Arc::clone(&store),
            ForecastConfig::default(),
            BatchConfig::default(),
        );

        let cancel = CancellationToken::new();
        cancel.cancel();
        let summary = orchestrator.recalculate_all(cancel).await.unwrap();
        assert_eq!(summary, RecalcSummary::default());
        assert!(store.persisted().await.is_empty());
    }
}
