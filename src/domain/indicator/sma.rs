//! Simple Moving Average.
//!
//! SMA(n) = sum of the last n values / n.

use super::trailing;

/// SMA over the trailing `period` values.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    let window = trailing(values, period)?;
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Rolling SMA. Element `i` covers `values[i..i + period]`, so the series has
/// `values.len() - period + 1` elements (empty when there is not enough data).
pub fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}
