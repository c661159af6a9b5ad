//! Domain Reliability Selector
//!
//! Decides whether the regression runs over percent-fill or absolute-volume
//! values. Field devices are inconsistent about which one they report, and a
//! column of nulls or hard zeros usually means "sensor not wired", so a
//! domain is only trusted when at least half the window carries a real value
//! for it.
//!
//! Percent is preferred. Volume is a fallback only when the tank capacity is
//! known, because capacity is needed to convert volume-domain results back
//! to percent for cross-domain reporting.

use crate::types::{runway_thresholds::DOMAIN_RELIABILITY_RATIO, TankContext, TankReading};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The unit space the regression runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateDomain {
    /// Percent-of-capacity fill levels
    Percent,
    /// Absolute volume levels (litres)
    Volume,
}

impl RateDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percent => "percent",
            Self::Volume => "volume",
        }
    }
}

impl std::fmt::Display for RateDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pick the primary rate domain for this window, or `None` when neither
/// domain is trustworthy (the pipeline then short-circuits to the empty
/// result).
pub fn select_domain(readings: &[TankReading], context: &TankContext) -> Option<RateDomain> {
    if domain_reliable(readings, |r| r.level_percent) {
        return Some(RateDomain::Percent);
    }

    if domain_reliable(readings, |r| r.level_volume) {
        if context.usable_capacity().is_some() {
            return Some(RateDomain::Volume);
        }
        debug!("volume domain reliable but capacity unknown — cannot convert, skipping");
    }

    None
}

/// At least half the readings must carry a non-null, non-zero, finite value.
fn domain_reliable<F>(readings: &[TankReading], value_of: F) -> bool
where
    F: Fn(&TankReading) -> Option<f64>,
{
    if readings.is_empty() {
        return false;
    }
    let usable = readings
        .iter()
        .filter(|r| matches!(value_of(r), Some(v) if v.is_finite() && v != 0.0))
        .count();
    usable as f64 / readings.len() as f64 >= DOMAIN_RELIABILITY_RATIO
}
