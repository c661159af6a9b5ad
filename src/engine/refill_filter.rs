//! Refill Event Filter
//!
//! A fuel delivery shows up in the reading history as a sudden level jump.
//! Left in place, it corrupts the slope estimate (the regression reads it as
//! negative consumption), so any reading whose percent level rises more than
//! the threshold over its predecessor is dropped before regression.
//!
//! The comparison reference is the immediately preceding reading in the RAW
//! sequence, never the last kept one. Consecutive large jumps are judged
//! step by step, so a single spurious spike cannot desensitize the filter
//! for the rest of the window.

use crate::types::TankReading;
use tracing::debug;

/// Drop readings whose percent level jumped more than `threshold` over the
/// immediately preceding raw reading.
///
/// The first reading is always kept. Missing percent values are treated as
/// zero for the comparison. Fewer than 2 readings pass through unchanged.
pub fn filter_refills(readings: &[TankReading], threshold: f64) -> Vec<TankReading> {
    if readings.len() < 2 {
        return readings.to_vec();
    }

    let mut kept = Vec::with_capacity(readings.len());
    kept.push(readings[0].clone());

    let mut dropped = 0usize;
    for window in readings.windows(2) {
        let (previous, current) = (&window[0], &window[1]);
        let change = current.percent_or_zero() - previous.percent_or_zero();
        if change > threshold {
            dropped += 1;
        } else {
            kept.push(current.clone());
        }
    }

    if dropped > 0 {
        debug!(
            dropped,
            kept = kept.len(),
            threshold,
            "refill events filtered from reading window"
        );
    }

    kept
}
