//! Stochastic Oscillator.
//!
//! %K[i] = (C[i] - LL(k)) / (HH(k) - LL(k)) * 100, or 50 when HH == LL.
//! %D = SMA(%K, d).

use super::sma::sma_series;
use crate::domain::ohlcv::Bar;

/// %K and %D aligned so that `k[i]` and `d[i]` refer to the same bar; the
/// last element of each is the most recent bar.
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

pub fn stochastic(bars: &[Bar], k_period: usize, d_period: usize) -> Option<StochasticSeries> {
    if k_period == 0 || bars.len() < k_period {
        return None;
    }

    let k: Vec<f64> = bars
        .windows(k_period)
        .map(|window| {
            let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
            let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
            let close = window[window.len() - 1].close;
            if highest != lowest {
                (close - lowest) / (highest - lowest) * 100.0
            } else {
                50.0
            }
        })
        .collect();

    let d = sma_series(&k, d_period);
    if d.is_empty() {
        return None;
    }

    let k = k[k.len() - d.len()..].to_vec();
    Some(StochasticSeries { k, d })
}
