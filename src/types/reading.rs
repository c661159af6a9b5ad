//! Tank telemetry value objects: level readings and per-tank context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default refill jump threshold: a level increase of more than this many
/// percentage points between consecutive readings is treated as a delivery.
pub const DEFAULT_REFILL_JUMP_THRESHOLD_PERCENT: f64 = 10.0;

/// A single tank level reading from a field device.
///
/// Either domain value may be missing: legacy senders report only percent
/// fill, some volumetric gauges report only litres. Readings arrive ordered
/// ascending by timestamp; duplicate timestamps are permitted and are the
/// ingestion layer's responsibility, not this engine's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankReading {
    /// When the device sampled the tank
    pub timestamp: DateTime<Utc>,
    /// Fill level as a percentage of capacity (0-100), if reported
    pub level_percent: Option<f64>,
    /// Fill level in volume units (litres), if reported
    pub level_volume: Option<f64>,
}

impl TankReading {
    pub fn new(
        timestamp: DateTime<Utc>,
        level_percent: Option<f64>,
        level_volume: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            level_percent,
            level_volume,
        }
    }

    /// Percent level with the null-as-zero convention used by the refill
    /// filter and the trend classifier.
    pub fn percent_or_zero(&self) -> f64 {
        self.level_percent.unwrap_or(0.0)
    }
}

/// Static context for a tank, supplied by the tank-context collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankContext {
    /// Total tank capacity in volume units. Must be positive and finite to
    /// enable cross-domain conversion; anything else disables volume-domain
    /// output only, never the whole computation.
    pub capacity_volume: Option<f64>,
    /// Most recently known fill percentage, used as the runway numerator
    pub current_level_percent: Option<f64>,
    /// Per-tank refill detection threshold (percentage points)
    #[serde(default = "default_refill_threshold")]
    pub refill_jump_threshold_percent: f64,
}

fn default_refill_threshold() -> f64 {
    DEFAULT_REFILL_JUMP_THRESHOLD_PERCENT
}

impl Default for TankContext {
    fn default() -> Self {
        Self {
            capacity_volume: None,
            current_level_percent: None,
            refill_jump_threshold_percent: DEFAULT_REFILL_JUMP_THRESHOLD_PERCENT,
        }
    }
}

impl TankContext {
    /// Capacity usable for cross-domain conversion: positive and finite.
    ///
    /// A zero, negative, or non-finite capacity is treated as "volume domain
    /// unavailable", not as an error.
    pub fn usable_capacity(&self) -> Option<f64> {
        self.capacity_volume.filter(|c| c.is_finite() && *c > 0.0)
    }
}
