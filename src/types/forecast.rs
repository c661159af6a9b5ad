//! Forecast output types: trend, confidence, and the assembled result.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Tunable pipeline thresholds (defaults — overridden by tankwatch.toml)
pub mod runway_thresholds {
    /// Consumption rate below this (domain units per day) is treated as no
    /// measurable draw; dividing by it would produce a nonsense runway.
    pub const MIN_MEASURABLE_RATE: f64 = 0.1;
    /// Hard ceiling on projected days remaining
    pub const MAX_RUNWAY_DAYS: f64 = 365.0;
    /// |slope| below this (percent/day) classifies the trend as stable
    pub const STABLE_SLOPE_PERCENT_PER_DAY: f64 = 0.5;
    /// Half-window mean shift (percentage points) beyond which consumption
    /// is accelerating or decelerating
    pub const TREND_DELTA_PERCENT: f64 = 5.0;
    /// Minimum refill-filtered readings for a non-empty forecast
    pub const MIN_PIPELINE_READINGS: usize = 3;
    /// Minimum share of readings with a usable value for a domain to be
    /// considered reliable
    pub const DOMAIN_RELIABILITY_RATIO: f64 = 0.5;
    /// High confidence: minimum data points
    pub const HIGH_CONFIDENCE_POINTS: usize = 7;
    /// High confidence: minimum fit quality
    pub const HIGH_CONFIDENCE_R2: f64 = 0.7;
    /// High confidence: minimum requested window length (days)
    pub const HIGH_CONFIDENCE_WINDOW_DAYS: u32 = 7;
    /// Medium confidence: minimum data points
    pub const MEDIUM_CONFIDENCE_POINTS: usize = 5;
    /// Medium confidence: minimum fit quality
    pub const MEDIUM_CONFIDENCE_R2: f64 = 0.5;
}

/// Direction the consumption rate itself is moving.
///
/// "Increasing" means the tank is draining faster in the recent half of the
/// window, not that the level is rising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    /// Consumption accelerating (level falling faster recently)
    Increasing,
    /// Consumption decelerating
    Decreasing,
    /// Steady draw or flat series
    Stable,
    /// Too little data, or an anomalous rising level
    Unknown,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Qualitative trust label for a forecast, from sample count, fit quality,
/// and analysis window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastConfidence {
    /// >= 7 points, r^2 > 0.7, window >= 7 days
    High,
    /// >= 5 points, r^2 > 0.5
    Medium,
    /// Everything else — the default
    Low,
}

impl ForecastConfidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for ForecastConfidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable forecast record assembled by the runway engine.
///
/// Recomputing from identical inputs and an identical `now` yields an
/// identical value: no hidden state, no randomness. `estimated_empty_date`
/// is the only field derived from the call-time clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Daily consumption in volume units, `None` when capacity is unknown
    pub daily_consumption_volume: Option<f64>,
    /// Daily consumption in percentage points
    pub daily_consumption_percent: Option<f64>,
    /// Projected days until empty, clamped to [0, 365]
    pub days_remaining: Option<f64>,
    /// Calendar date the tank is projected to run dry
    pub estimated_empty_date: Option<NaiveDate>,
    /// Consumption trend over the analysis window
    pub trend: TrendDirection,
    /// How trustworthy this forecast is
    pub confidence: ForecastConfidence,
    /// Readings that survived refill filtering
    pub data_points: usize,
    /// Regression fit quality, surfaced for dashboards
    pub r_squared: Option<f64>,
}

impl ForecastResult {
    /// The canonical "insufficient data" result.
    ///
    /// A first-class success outcome, not an error: every numeric field is
    /// `None`, trend unknown, confidence low.
    pub fn empty(data_points: usize) -> Self {
        Self {
            daily_consumption_volume: None,
            daily_consumption_percent: None,
            days_remaining: None,
            estimated_empty_date: None,
            trend: TrendDirection::Unknown,
            confidence: ForecastConfidence::Low,
            data_points,
            r_squared: None,
        }
    }

    /// Integer-rounded days remaining for display surfaces.
    #[allow(clippy::cast_possible_truncation)]
    pub fn days_remaining_display(&self) -> Option<i64> {
        self.days_remaining.map(|d| d.round() as i64)
    }

    /// Whether this is the empty/insufficient-data result.
    pub fn is_empty(&self) -> bool {
        self.daily_consumption_percent.is_none()
            && self.daily_consumption_volume.is_none()
            && self.days_remaining.is_none()
    }
}
