//! Collaborator contracts consumed by the forecasting service.
//!
//! The engine never fetches anything itself: reading history, tank context,
//! tank enumeration, and result persistence all live behind these traits.
//! Implementations own their retries and connection handling; errors cross
//! the boundary as `anyhow::Error` and are either propagated (single-tank
//! forecast) or counted per tank (batch recalculation).

use crate::types::{ForecastResult, TankContext, TankReading};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Supplies a tank's reading history.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Readings covering at least `window_days` back from now, ordered
    /// ascending by timestamp. May return fewer if history is shorter.
    async fn fetch_readings(&self, tank_id: &str, window_days: u32) -> Result<Vec<TankReading>>;
}

/// Supplies a tank's static context (capacity, current level, thresholds).
#[async_trait]
pub trait TankContextSource: Send + Sync {
    async fn fetch_tank_context(&self, tank_id: &str) -> Result<TankContext>;
}

/// Enumerates the tank population for batch recalculation.
#[async_trait]
pub trait TankDirectory: Send + Sync {
    async fn list_tank_ids(&self) -> Result<Vec<String>>;
}

/// Receives assembled forecasts.
#[async_trait]
pub trait ForecastSink: Send + Sync {
    /// Idempotent upsert keyed by tank id.
    async fn persist(&self, tank_id: &str, result: &ForecastResult) -> Result<()>;
}

// ============================================================================
// In-Memory Store (tests, demos, replay harnesses)
// ============================================================================

#[derive(Debug, Clone)]
struct TankRecord {
    readings: Vec<TankReading>,
    context: TankContext,
}

/// In-memory implementation of every collaborator trait.
///
/// Pre-loaded with fixed reading windows per tank; `fetch_readings` replays
/// them as-is regardless of the requested window (the fixture decides what
/// the window contains). Persisted forecasts are retained for inspection.
#[derive(Default)]
pub struct InMemoryTankStore {
    tanks: HashMap<String, TankRecord>,
    persisted: Arc<Mutex<HashMap<String, ForecastResult>>>,
}

impl InMemoryTankStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tank with its reading history and context.
    pub fn add_tank(
        &mut self,
        tank_id: impl Into<String>,
        readings: Vec<TankReading>,
        context: TankContext,
    ) {
        self.tanks
            .insert(tank_id.into(), TankRecord { readings, context });
    }

    /// Snapshot of everything persisted so far.
    pub async fn persisted(&self) -> HashMap<String, ForecastResult> {
        self.persisted.lock().await.clone()
    }

    /// Last persisted forecast for one tank.
    pub async fn persisted_for(&self, tank_id: &str) -> Option<ForecastResult> {
        self.persisted.lock().await.get(tank_id).cloned()
    }

    fn record(&self, tank_id: &str) -> Result<&TankRecord> {
        self.tanks
            .get(tank_id)
            .ok_or_else(|| anyhow::anyhow!("unknown tank: {tank_id}"))
    }
}

#[async_trait]
impl ReadingSource for InMemoryTankStore {
    async fn fetch_readings(&self, tank_id: &str, _window_days: u32) -> Result<Vec<TankReading>> {
        Ok(self.record(tank_id)?.readings.clone())
    }
}

#[async_trait]
impl TankContextSource for InMemoryTankStore {
    async fn fetch_tank_context(&self, tank_id: &str) -> Result<TankContext> {
        Ok(self.record(tank_id)?.context.clone())
    }
}

#[async_trait]
impl TankDirectory for InMemoryTankStore {
    async fn list_tank_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.tanks.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl ForecastSink for InMemoryTankStore {
    async fn persist(&self, tank_id: &str, result: &ForecastResult) -> Result<()> {
        self.persisted
            .lock()
            .await
            .insert(tank_id.to_string(), result.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_in_memory_store_roundtrip() {
        let mut store = InMemoryTankStore::new();
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        store.add_tank(
            "T1",
            vec![TankReading::new(ts, Some(80.0), None)],
            TankContext::default(),
        );

        let ids = store.list_tank_ids().await.unwrap();
        assert_eq!(ids, vec!["T1".to_string()]);

        let readings = store.fetch_readings("T1", 7).await.unwrap();
        assert_eq!(readings.len(), 1);

        assert!(store.fetch_readings("T2", 7).await.is_err());

        let result = ForecastResult::empty(1);
        store.persist("T1", &result).await.unwrap();
        assert_eq!(store.persisted_for("T1").await, Some(result));
    }

    #[tokio::test]
    async fn test_persist_is_an_upsert() {
        let store = InMemoryTankStore::new();
        store.persist("T1", &ForecastResult::empty(1)).await.unwrap();
        store.persist("T1", &ForecastResult::empty(9)).await.unwrap();

        let persisted = store.persisted().await;
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted.get("T1").map(|r| r.data_points), Some(9));
    }
}
