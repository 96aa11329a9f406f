//! Bollinger Bands.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//! - Bandwidth: (Upper - Lower) / Middle
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).

use super::sma::sma;
use super::stddev::stddev;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub bandwidth: f64,
}

pub fn bollinger(closes: &[f64], period: usize, multiplier: f64) -> Option<BollingerBands> {
    let middle = sma(closes, period)?;
    let deviation = stddev(closes, period)?;

    let upper = middle + deviation * multiplier;
    let lower = middle - deviation * multiplier;
    // A zero middle band only occurs on degenerate all-zero prices.
    let bandwidth = if middle != 0.0 {
        (upper - lower) / middle
    } else {
        0.0
    };

    Some(BollingerBands {
        upper,
        middle,
        lower,
        bandwidth,
    })
}
