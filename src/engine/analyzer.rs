//! Runway Analyzer
//!
//! Orchestrates the full forecasting pipeline over one tank's reading
//! window:
//! 1. Refill filtering (drop delivery jumps)
//! 2. Domain reliability selection (percent vs volume)
//! 3. Least-squares regression (slope, r^2)
//! 4. Rate/runway projection (daily consumption, days remaining)
//! 5. Trend classification
//! 6. Confidence scoring
//! 7. Result assembly
//!
//! Pure computation: no I/O, no shared state, fully reentrant. The caller
//! supplies `now`; the only field derived from it is the estimated empty
//! date. Data-quality dead ends (no reliable domain, too few readings)
//! yield the canonical empty result, never an error.

use crate::engine::confidence;
use crate::engine::domain::{self, RateDomain};
use crate::engine::refill_filter;
use crate::engine::regression;
use crate::engine::runway;
use crate::engine::trend;
use crate::types::{
    runway_thresholds::MIN_PIPELINE_READINGS, ForecastResult, TankContext, TankReading,
};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Stateless pipeline orchestrator.
pub struct RunwayAnalyzer;

impl RunwayAnalyzer {
    /// Compute a forecast from a raw reading window and tank context.
    ///
    /// `window_days` is the length of history that was *requested* from the
    /// reading source; it feeds the confidence scorer, not the filtering.
    pub fn analyze(
        readings: &[TankReading],
        context: &TankContext,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> ForecastResult {
        let filtered =
            refill_filter::filter_refills(readings, context.refill_jump_threshold_percent);
        let data_points = filtered.len();

        if data_points < MIN_PIPELINE_READINGS {
            debug!(
                raw = readings.len(),
                filtered = data_points,
                "insufficient readings after refill filtering"
            );
            return ForecastResult::empty(data_points);
        }

        let Some(selected) = domain::select_domain(&filtered, context) else {
            debug!(filtered = data_points, "no reliable level domain in window");
            return ForecastResult::empty(data_points);
        };

        let points = regression::regression_points(&filtered, selected);
        let fitted = regression::fit(&points);
        debug!(
            domain = %selected,
            slope = fitted.slope,
            r_squared = fitted.r_squared,
            p_value = fitted.p_value,
            points = fitted.sample_count,
            "regression fitted"
        );

        let projection = runway::project_runway(&fitted, context, selected, now);

        // The classifier works in percent/day; volume-domain slopes convert
        // via capacity, which is guaranteed known when volume was selected.
        let slope_percent_per_day = match selected {
            RateDomain::Percent => fitted.slope,
            RateDomain::Volume => context
                .usable_capacity()
                .map_or(0.0, |c| fitted.slope / c * 100.0),
        };
        let trend = trend::classify(&filtered, slope_percent_per_day);
        let confidence = confidence::score(data_points, fitted.r_squared, window_days);

        ForecastResult {
            daily_consumption_volume: projection.daily_consumption_volume,
            daily_consumption_percent: projection.daily_consumption_percent,
            days_remaining: projection.days_remaining,
            estimated_empty_date: projection.estimated_empty_date,
            trend,
            confidence,
            data_points,
            r_squared: Some(fitted.r_squared),
        }
    }
}
