//! Least-Squares Regression Engine
//!
//! Ordinary least squares over (days-since-first-reading, level) points,
//! with a slope significance diagnostic via Student's t-distribution
//! (statrs). Degenerate series — zero time variance or zero level variance —
//! fail soft to a zero slope and zero r^2 rather than erroring; downstream
//! stages read that as "flat/unknown".

use crate::engine::domain::RateDomain;
use crate::types::TankReading;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// A single (x = days elapsed, y = level) observation. Derived, never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionPoint {
    pub x: f64,
    pub y: f64,
}

/// Fitted line summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionSummary {
    /// Signed level change per day in the regression domain's units.
    /// Negative = level decreasing = consuming.
    pub slope: f64,
    /// Coefficient of determination in [0, 1]
    pub r_squared: f64,
    /// Two-tailed p-value for the slope (diagnostic only)
    pub p_value: f64,
    /// Points the fit was computed over
    pub sample_count: usize,
}

impl RegressionSummary {
    /// Zero-slope summary for degenerate inputs.
    pub fn degenerate(sample_count: usize) -> Self {
        Self {
            slope: 0.0,
            r_squared: 0.0,
            p_value: 1.0,
            sample_count,
        }
    }
}

/// Fit a least-squares line through the points.
///
/// Fewer than 2 points, or zero variance in x, yields the degenerate
/// summary. Zero variance in y yields a zero slope with r^2 = 0.
pub fn fit(points: &[RegressionPoint]) -> RegressionSummary {
    let n = points.len();
    if n < 2 {
        return RegressionSummary::degenerate(n);
    }

    let count = n as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / count;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / count;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for p in points {
        let dx = p.x - mean_x;
        let dy = p.y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 {
        return RegressionSummary::degenerate(n);
    }

    let slope = sxy / sxx;
    if syy == 0.0 {
        return RegressionSummary {
            slope,
            r_squared: 0.0,
            p_value: 1.0,
            sample_count: n,
        };
    }

    let r = sxy / (sxx * syy).sqrt();
    RegressionSummary {
        slope,
        r_squared: r * r,
        p_value: slope_p_value(r, n),
        sample_count: n,
    }
}

/// Build regression points from filtered readings in the chosen domain.
///
/// x is days elapsed since the first reading of the filtered window; y is
/// the reading's value in the domain. Readings without a finite value in the
/// domain contribute no point.
pub fn regression_points(filtered: &[TankReading], domain: RateDomain) -> Vec<RegressionPoint> {
    let Some(first) = filtered.first() else {
        return Vec::new();
    };
    let origin = first.timestamp;

    filtered
        .iter()
        .filter_map(|r| {
            let value = match domain {
                RateDomain::Percent => r.level_percent,
                RateDomain::Volume => r.level_volume,
            };
            value.filter(|v| v.is_finite()).map(|y| RegressionPoint {
                x: (r.timestamp - origin).num_milliseconds() as f64 / 86_400_000.0,
                y,
            })
        })
        .collect()
}

/// Two-tailed p-value for a correlation r over n samples, via the Student's
/// t-distribution with n-2 degrees of freedom: t = r*sqrt(n-2)/sqrt(1-r^2).
fn slope_p_value(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }
    // A perfect fit saturates the t statistic.
    if r.abs() >= 0.9999 {
        return 0.0;
    }

    let df = (n - 2) as f64;
    let t_stat = r * df.sqrt() / (1.0 - r * r).sqrt();

    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t_stat.abs())),
        Err(_) => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn points(pairs: &[(f64, f64)]) -> Vec<RegressionPoint> {
        pairs.iter().map(|&(x, y)| RegressionPoint { x, y }).collect()
    }

    #[test]
    fn test_exact_linear_fit() {
        let summary = fit(&points(&[(0.0, 80.0), (1.0, 75.0), (2.0, 70.0), (3.0, 65.0)]));
        assert!((summary.slope - (-5.0)).abs() < 1e-9);
        assert!((summary.r_squared - 1.0).abs() < 1e-9);
        assert!(summary.p_value < 0.001);
        assert_eq!(summary.sample_count, 4);
    }

    #[test]
    fn test_constant_series_is_degenerate() {
        let summary = fit(&points(&[(0.0, 50.0), (1.0, 50.0), (2.0, 50.0)]));
        assert!((summary.slope - 0.0).abs() < 1e-12);
        assert!((summary.r_squared - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_time_variance_is_degenerate() {
        // Duplicate timestamps only: Sxx == 0 must not divide.
        let summary = fit(&points(&[(0.0, 80.0), (0.0, 60.0), (0.0, 40.0)]));
        assert!((summary.slope - 0.0).abs() < 1e-12);
        assert!((summary.r_squared - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_fewer_than_two_points() {
        assert_eq!(fit(&[]), RegressionSummary::degenerate(0));
        assert_eq!(fit(&points(&[(0.0, 50.0)])), RegressionSummary::degenerate(1));
    }

    #[test]
    fn test_noisy_fit_has_partial_r_squared() {
        let summary = fit(&points(&[
            (0.0, 80.0),
            (1.0, 76.0),
            (2.0, 73.0),
            (3.0, 65.0),
            (4.0, 64.0),
        ]));
        assert!(summary.slope < 0.0);
        assert!(summary.r_squared > 0.8 && summary.r_squared < 1.0);
    }

    #[test]
    fn test_regression_points_skip_missing_values() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let readings = vec![
            TankReading::new(base, Some(80.0), None),
            TankReading::new(base + Duration::days(1), None, Some(700.0)),
            TankReading::new(base + Duration::days(2), Some(70.0), None),
        ];

        let pts = regression_points(&readings, RateDomain::Percent);
        assert_eq!(pts.len(), 2);
        assert!((pts[0].x - 0.0).abs() < 1e-9);
        assert!((pts[1].x - 2.0).abs() < 1e-9);
        assert!((pts[1].y - 70.0).abs() < 1e-9);

        let pts = regression_points(&readings, RateDomain::Volume);
        assert_eq!(pts.len(), 1);
    }

    #[test]
    fn test_x_axis_is_fractional_days() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let readings = vec![
            TankReading::new(base, Some(80.0), None),
            TankReading::new(base + Duration::hours(12), Some(78.0), None),
        ];
        let pts = regression_points(&readings, RateDomain::Percent);
        assert!((pts[1].x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_p_value_grows_with_noise() {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        // Pure noise around a constant level should not look significant.
        let noise: Vec<RegressionPoint> = (0..30)
            .map(|i| RegressionPoint {
                x: f64::from(i),
                y: 50.0 + rng.gen_range(-1.0..1.0),
            })
            .collect();
        let summary = fit(&noise);
        assert!(
            summary.p_value > 0.001,
            "pure noise should rarely be highly significant, got p={}",
            summary.p_value
        );
    }
}
