//! Highest high / lowest low over a trailing window of bars.

use super::trailing;
use crate::domain::ohlcv::Bar;

pub fn highest_high(bars: &[Bar], period: usize) -> Option<f64> {
    let window = trailing(bars, period)?;
    Some(window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max))
}

pub fn lowest_low(bars: &[Bar], period: usize) -> Option<f64> {
    let window = trailing(bars, period)?;
    Some(window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min))
}

/// (highest high + lowest low) / 2 over the window.
pub fn midpoint(bars: &[Bar], period: usize) -> Option<f64> {
    Some((highest_high(bars, period)? + lowest_low(bars, period)?) / 2.0)
}
