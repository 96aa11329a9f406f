//! MACD (Moving Average Convergence Divergence).
//!
//! MACD line = EMA(fast) - EMA(slow), aligned on the most recent value.
//! Signal line = EMA(signal) of the MACD line.
//! Histogram = MACD line - signal line.

use super::ema::ema_series;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD at the last close. `None` when either EMA or the signal EMA cannot be
/// seeded from the closes given.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdPoint> {
    let fast_ema = ema_series(closes, fast);
    let slow_ema = ema_series(closes, slow);

    let len = fast_ema.len().min(slow_ema.len());
    if len == 0 {
        return None;
    }

    let macd_line: Vec<f64> = fast_ema[fast_ema.len() - len..]
        .iter()
        .zip(&slow_ema[slow_ema.len() - len..])
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = ema_series(&macd_line, signal);
    let line = *macd_line.last()?;
    let signal = *signal_line.last()?;

    Some(MacdPoint {
        line,
        signal,
        histogram: line - signal,
    })
}
