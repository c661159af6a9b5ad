//! Core value objects shared across the forecasting pipeline.

mod forecast;
mod reading;

pub use forecast::{runway_thresholds, ForecastConfidence, ForecastResult, TrendDirection};
pub use reading::{TankContext, TankReading, DEFAULT_REFILL_JUMP_THRESHOLD_PERCENT};
