//! Fuel Runway Forecasting Engine
//!
//! Turns a noisy, irregularly-sampled tank level history into a consumption
//! forecast: daily rate, days-until-empty, trend, and a confidence label.
//!
//! ## Key Features
//! - Refill-aware: delivery jumps are filtered before rate estimation
//! - Dual-domain: regresses percent fill or absolute volume, whichever the
//!   window actually supports, converting across via tank capacity
//! - Degenerate-safe: flat or near-empty windows fail soft to the empty
//!   result instead of erroring
//! - Slope significance diagnostic (Student's t via statrs)
//!
//! ## Architecture
//! - `refill_filter`: drop sudden level-increase events (deliveries)
//! - `domain`: percent-vs-volume reliability selection
//! - `regression`: ordinary least squares (slope, r^2, p-value)
//! - `runway`: rate conversion and days-until-empty projection
//! - `trend`: half-window mean comparison classifier
//! - `confidence`: sample-count / fit-quality / window-length scoring
//! - `analyzer`: the pipeline orchestrator

pub mod analyzer;
pub mod confidence;
pub mod domain;
pub mod refill_filter;
pub mod regression;
pub mod runway;
pub mod trend;

// Re-export public types
pub use analyzer::RunwayAnalyzer;
pub use domain::{select_domain, RateDomain};
pub use refill_filter::filter_refills;
pub use regression::{fit, regression_points, RegressionPoint, RegressionSummary};
pub use runway::{project_runway, RunwayProjection};
pub use trend::classify;
