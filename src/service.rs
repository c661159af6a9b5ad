//! Forecast Service
//!
//! Single-tank entry point: fetches the reading window and tank context
//! from the collaborators, runs the pure pipeline, and returns the
//! assembled forecast. Collaborator failures propagate to the caller;
//! data-quality problems never do (they surface as the empty result).

use crate::config::ForecastConfig;
use crate::engine::RunwayAnalyzer;
use crate::providers::{ReadingSource, TankContextSource};
use crate::types::ForecastResult;
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Ties the collaborators to the runway engine for one-tank forecasts.
pub struct ForecastService<S> {
    source: Arc<S>,
    config: ForecastConfig,
}

impl<S> ForecastService<S>
where
    S: ReadingSource + TankContextSource,
{
    pub fn new(source: Arc<S>, config: ForecastConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast with the configured window and the tank's own refill
    /// threshold.
    pub async fn forecast(&self, tank_id: &str) -> Result<ForecastResult> {
        self.forecast_with(tank_id, self.config.window_days, None).await
    }

    /// Forecast with an explicit window and an optional refill threshold
    /// override (replaces the threshold carried by the tank context).
    pub async fn forecast_with(
        &self,
        tank_id: &str,
        window_days: u32,
        refill_threshold: Option<f64>,
    ) -> Result<ForecastResult> {
        let readings = self
            .source
            .fetch_readings(tank_id, window_days)
            .await
            .with_context(|| format!("failed to fetch readings for tank {tank_id}"))?;

        let mut context = self
            .source
            .fetch_tank_context(tank_id)
            .await
            .with_context(|| format!("failed to fetch context for tank {tank_id}"))?;

        if let Some(threshold) = refill_threshold {
            context.refill_jump_threshold_percent = threshold;
        }

        let result = RunwayAnalyzer::analyze(&readings, &context, window_days, Utc::now());

        info!(
            tank_id = %tank_id,
            data_points = result.data_points,
            trend = %result.trend,
            confidence = %result.confidence,
            days_remaining = ?result.days_remaining_display(),
            "forecast computed"
        );

        Ok(result)
    }
}
