//! Tankwatch: Fleet Fuel Tank Intelligence
//!
//! Runway forecasting for fleet fuel monitoring: given a noisy,
//! irregularly-sampled history of tank fill levels, estimate the daily
//! consumption rate, project days-until-empty, classify the trend, and
//! score confidence — robust to refill events that corrupt naive slope
//! estimates.
//!
//! ## Architecture
//!
//! - **Runway Engine**: pure statistical pipeline (refill filter → domain
//!   selection → regression → runway projection → trend → confidence)
//! - **Forecast Service**: single-tank entry point over collaborator traits
//! - **Recalc Orchestrator**: bounded-concurrency batch recalculation with
//!   per-tank failure isolation
//! - **Forecast Store**: sled-backed upsert persistence keyed by tank id
//! - **Scheduler**: interval loop driving batch runs

pub mod batch;
pub mod config;
pub mod engine;
pub mod providers;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod types;

// Re-export configuration
pub use config::{BatchConfig, ConfigError, ForecastConfig, TankwatchConfig};

// Re-export commonly used types
pub use types::{
    runway_thresholds, ForecastConfidence, ForecastResult, TankContext, TankReading,
    TrendDirection,
};

// Re-export engine components
pub use engine::{RateDomain, RegressionPoint, RegressionSummary, RunwayAnalyzer};

// Re-export collaborator contracts
pub use providers::{
    ForecastSink, InMemoryTankStore, ReadingSource, TankContextSource, TankDirectory,
};

// Re-export orchestration
pub use batch::{RecalcOrchestrator, RecalcSummary};
pub use scheduler::RecalcScheduler;
pub use service::ForecastService;

// Re-export storage
pub use store::{ForecastStore, StoreError, StoreStats};
