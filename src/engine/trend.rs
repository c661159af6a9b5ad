//! Trend Classifier
//!
//! Compares the mean level of the first and second halves of the filtered
//! window to decide whether consumption is accelerating, decelerating, or
//! steady. The slope input must be in percent/day regardless of which
//! domain the regression ran in.

use crate::types::{
    runway_thresholds::{MIN_PIPELINE_READINGS, STABLE_SLOPE_PERCENT_PER_DAY, TREND_DELTA_PERCENT},
    TankReading, TrendDirection,
};

/// Classify the consumption trend over the filtered window.
///
/// Fewer than 3 readings cannot support a half-window comparison and yield
/// `Unknown`. A shallow slope is `Stable` outright. Otherwise the sign and
/// size of the half-window mean shift decide: the level falling faster in
/// the recent half means consumption is increasing. A rising level with a
/// meaningful slope is anomalous (likely an unfiltered refill tail) and is
/// reported as `Unknown` rather than as a consumption trend.
pub fn classify(filtered: &[TankReading], slope_percent_per_day: f64) -> TrendDirection {
    if filtered.len() < MIN_PIPELINE_READINGS {
        return TrendDirection::Unknown;
    }

    let mid = filtered.len() / 2;
    let first_mean = mean_percent(&filtered[..mid]);
    let second_mean = mean_percent(&filtered[mid..]);
    let delta = second_mean - first_mean;

    if slope_percent_per_day.abs() < STABLE_SLOPE_PERCENT_PER_DAY {
        TrendDirection::Stable
    } else if delta < -TREND_DELTA_PERCENT {
        TrendDirection::Increasing
    } else if delta > TREND_DELTA_PERCENT {
        TrendDirection::Decreasing
    } else if slope_percent_per_day < 0.0 {
        TrendDirection::Stable
    } else {
        TrendDirection::Unknown
    }
}

fn mean_percent(readings: &[TankReading]) -> f64 {
    if readings.is_empty() {
        return 0.0;
    }
    readings.iter().map(TankReading::percent_or_zero).sum::<f64>() / readings.len() as f64
}
