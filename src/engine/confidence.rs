//! Confidence Scorer
//!
//! Rolls sample count, fit quality, and the requested window length into a
//! single qualitative label. Low is the fallback, never an error.

use crate::types::{
    runway_thresholds::{
        HIGH_CONFIDENCE_POINTS, HIGH_CONFIDENCE_R2, HIGH_CONFIDENCE_WINDOW_DAYS,
        MEDIUM_CONFIDENCE_POINTS, MEDIUM_CONFIDENCE_R2,
    },
    ForecastConfidence,
};

/// Score a forecast's trustworthiness.
pub fn score(data_points: usize, r_squared: f64, window_days_requested: u32) -> ForecastConfidence {
    if data_points >= HIGH_CONFIDENCE_POINTS
        && r_squared > HIGH_CONFIDENCE_R2
        && window_days_requested >= HIGH_CONFIDENCE_WINDOW_DAYS
    {
        ForecastConfidence::High
    } else if data_points >= MEDIUM_CONFIDENCE_POINTS && r_squared > MEDIUM_CONFIDENCE_R2 {
        ForecastConfidence::Medium
    } else {
        ForecastConfidence::Low
    }
}
