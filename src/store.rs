//! Forecast Store
//!
//! Sled-backed persistence for assembled forecasts, keyed by tank id.
//! `persist` is an idempotent upsert: recomputing a tank's forecast simply
//! replaces the previous record.
//!
//! Note: Does not call flush() on each write. Sled provides durability via
//! background flushing; on crash the last few writes may be lost, which is
//! acceptable because every forecast is regenerated on the next batch run.

use crate::providers::ForecastSink;
use crate::types::ForecastResult;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Forecast persistence keyed by tank id.
#[derive(Clone)]
pub struct ForecastStore {
    db: Arc<sled::Db>,
}

impl ForecastStore {
    /// Open or create the store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Upsert the forecast for a tank.
    ///
    /// Key: tank id bytes. Value: JSON-serialized `ForecastResult`.
    pub fn put(&self, tank_id: &str, result: &ForecastResult) -> Result<(), StoreError> {
        let value = serde_json::to_vec(result)?;
        self.db.insert(tank_id.as_bytes(), value)?;
        Ok(())
    }

    /// Fetch the stored forecast for a tank, if any.
    pub fn get(&self, tank_id: &str) -> Result<Option<ForecastResult>, StoreError> {
        match self.db.get(tank_id.as_bytes())? {
            Some(value) => Ok(Some(serde_json::from_slice(&value)?)),
            None => Ok(None),
        }
    }

    /// Remove a tank's forecast (e.g. after decommissioning).
    pub fn remove(&self, tank_id: &str) -> Result<(), StoreError> {
        self.db.remove(tank_id.as_bytes())?;
        Ok(())
    }

    /// All stored forecasts. Corrupt entries are skipped with a warning
    /// rather than failing the whole scan.
    pub fn all(&self) -> Vec<(String, ForecastResult)> {
        let mut forecasts = Vec::new();
        for item in self.db.iter() {
            let Ok((key, value)) = item else { continue };
            let tank_id = String::from_utf8_lossy(&key).to_string();
            match serde_json::from_slice::<ForecastResult>(&value) {
                Ok(result) => forecasts.push((tank_id, result)),
                Err(e) => {
                    warn!(tank_id = %tank_id, error = %e, "skipping corrupt forecast record");
                }
            }
        }
        forecasts
    }

    /// Number of stored forecasts.
    pub fn count(&self) -> usize {
        self.db.len()
    }

    /// Clear all forecasts.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.db.clear()?;
        self.db.flush()?;
        Ok(())
    }

    /// Store statistics for observability endpoints.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            forecast_count: self.count(),
            size_bytes: self.db.size_on_disk().unwrap_or(0),
        }
    }
}

#[async_trait]
impl ForecastSink for ForecastStore {
    async fn persist(&self, tank_id: &str, result: &ForecastResult) -> anyhow::Result<()> {
        self.put(tank_id, result)?;
        Ok(())
    }
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub forecast_count: usize,
    pub size_bytes: u64,
}
