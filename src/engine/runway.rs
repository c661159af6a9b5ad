//! Rate/Runway Calculator
//!
//! Turns a fitted slope into daily consumption figures in both domains and
//! projects days-until-empty. Conversion between percent and volume needs a
//! known capacity; without one the volume side of the output is simply
//! absent. The runway division is guarded against near-zero rates and the
//! result is hard-clamped to [0, 365] days.

use crate::engine::domain::RateDomain;
use crate::engine::regression::RegressionSummary;
use crate::types::{
    runway_thresholds::{MAX_RUNWAY_DAYS, MIN_MEASURABLE_RATE},
    TankContext,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Consumption rates and projected runway in the selected domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunwayProjection {
    pub daily_consumption_percent: Option<f64>,
    pub daily_consumption_volume: Option<f64>,
    /// Clamped to [0, MAX_RUNWAY_DAYS]
    pub days_remaining: Option<f64>,
    pub estimated_empty_date: Option<NaiveDate>,
}

/// Project consumption rates and runway from the fitted regression.
///
/// `rate = |slope|` in the domain's units per day. The runway is computed
/// only when the rate clears the epsilon guard and the current level is
/// known; the empty date only when the (clamped) runway lands inside the
/// projection horizon.
pub fn project_runway(
    regression: &RegressionSummary,
    context: &TankContext,
    domain: RateDomain,
    now: DateTime<Utc>,
) -> RunwayProjection {
    let rate = regression.slope.abs();
    let capacity = context.usable_capacity();

    let (daily_consumption_percent, daily_consumption_volume) = match domain {
        RateDomain::Percent => (Some(rate), capacity.map(|c| rate * c / 100.0)),
        // Volume is only selected as primary when capacity is known, so the
        // percent side is always derivable here.
        RateDomain::Volume => (capacity.map(|c| rate / c * 100.0), Some(rate)),
    };

    let current_in_domain = match domain {
        RateDomain::Percent => context.current_level_percent,
        RateDomain::Volume => match (context.current_level_percent, capacity) {
            (Some(percent), Some(c)) => Some(c * percent / 100.0),
            _ => None,
        },
    };

    let days_remaining = match current_in_domain {
        Some(level) if rate > MIN_MEASURABLE_RATE => {
            Some((level / rate).clamp(0.0, MAX_RUNWAY_DAYS))
        }
        _ => None,
    };

    let estimated_empty_date = days_remaining
        .filter(|d| *d < MAX_RUNWAY_DAYS)
        .map(|d| empty_date(now, d));

    RunwayProjection {
        daily_consumption_percent,
        daily_consumption_volume,
        days_remaining,
        estimated_empty_date,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn empty_date(now: DateTime<Utc>, days: f64) -> NaiveDate {
    let seconds = (days * 86_400.0).round() as i64;
    (now + Duration::seconds(seconds)).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn summary_with_slope(slope: f64) -> RegressionSummary {
        RegressionSummary {
            slope,
            r_squared: 1.0,
            p_value: 0.0,
            sample_count: 4,
        }
    }

    fn context(capacity: Option<f64>, current_percent: Option<f64>) -> TankContext {
        TankContext {
            capacity_volume: capacity,
            current_level_percent: current_percent,
            ..TankContext::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_percent_domain_with_capacity_converts_volume() {
        let projection = project_runway(
            &summary_with_slope(-5.0),
            &context(Some(1000.0), Some(65.0)),
            RateDomain::Percent,
            now(),
        );
        assert_eq!(projection.daily_consumption_percent, Some(5.0));
        assert_eq!(projection.daily_consumption_volume, Some(50.0));
        assert_eq!(projection.days_remaining, Some(13.0));
        assert_eq!(
            projection.estimated_empty_date,
            Some(NaiveDate::from_ymd_opt(2024, 3, 23).unwrap())
        );
    }

    #[test]
    fn test_percent_domain_without_capacity_has_no_volume() {
        let projection = project_runway(
            &summary_with_slope(-5.0),
            &context(None, Some(65.0)),
            RateDomain::Percent,
            now(),
        );
        assert_eq!(projection.daily_consumption_percent, Some(5.0));
        assert_eq!(projection.daily_consumption_volume, None);
        assert_eq!(projection.days_remaining, Some(13.0));
    }

    #[test]
    fn test_volume_domain_converts_back_to_percent() {
        // 50 litres/day on a 1000 litre tank = 5 percent/day; current level
        // 65% of 1000 = 650 litres -> 13 days.
        let projection = project_runway(
            &summary_with_slope(-50.0),
            &context(Some(1000.0), Some(65.0)),
            RateDomain::Volume,
            now(),
        );
        assert_eq!(projection.daily_consumption_percent, Some(5.0));
        assert_eq!(projection.daily_consumption_volume, Some(50.0));
        assert_eq!(projection.days_remaining, Some(13.0));
    }

    #[test]
    fn test_epsilon_guard_blocks_near_zero_rates() {
        let projection = project_runway(
            &summary_with_slope(-0.05),
            &context(Some(1000.0), Some(65.0)),
            RateDomain::Percent,
            now(),
        );
        assert_eq!(projection.daily_consumption_percent, Some(0.05));
        assert_eq!(projection.days_remaining, None);
        assert_eq!(projection.estimated_empty_date, None);
    }

    #[test]
    fn test_runway_clamped_to_max_and_date_suppressed() {
        // 90% at 0.2 percent/day implies 450 days — clamp to 365, and a
        // clamped runway gets no empty date.
        let projection = project_runway(
            &summary_with_slope(-0.2),
            &context(None, Some(90.0)),
            RateDomain::Percent,
            now(),
        );
        assert_eq!(projection.days_remaining, Some(365.0));
        assert_eq!(projection.estimated_empty_date, None);
    }

    #[test]
    fn test_negative_runway_clamped_to_zero() {
        let projection = project_runway(
            &summary_with_slope(-5.0),
            &context(None, Some(-10.0)),
            RateDomain::Percent,
            now(),
        );
        assert_eq!(projection.days_remaining, Some(0.0));
        // Empty "now": the projected date is today.
        assert_eq!(projection.estimated_empty_date, Some(now().date_naive()));
    }

    #[test]
    fn test_unknown_current_level_yields_no_runway() {
        let projection = project_runway(
            &summary_with_slope(-5.0),
            &context(Some(1000.0), None),
            RateDomain::Percent,
            now(),
        );
        assert_eq!(projection.daily_consumption_percent, Some(5.0));
        assert_eq!(projection.days_remaining, None);
    }

    #[test]
    fn test_rising_level_uses_absolute_rate() {
        // A positive slope (level rising, e.g. slow refill drift) still
        // reports an absolute rate; runway math proceeds on magnitude.
        let projection = project_runway(
            &summary_with_slope(5.0),
            &context(None, Some(65.0)),
            RateDomain::Percent,
            now(),
        );
        assert_eq!(projection.daily_consumption_percent, Some(5.0));
        assert_eq!(projection.days_remaining, Some(13.0));
    }
}
