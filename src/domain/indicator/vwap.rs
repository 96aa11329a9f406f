//! Rolling Volume-Weighted Average Price with a volume-weighted deviation.
//!
//! VWAP = sum(TP * V) / sum(V) over the last n bars, TP = typical price.
//! Deviation = sqrt(sum((TP - VWAP)^2 * V) / sum(V)).
//! Bars with zero, negative or missing volume count with a volume of 1.

use super::trailing;
use crate::domain::ohlcv::Bar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VwapBand {
    pub vwap: f64,
    pub std_dev: f64,
}

impl VwapBand {
    pub fn upper(&self, deviation: f64) -> f64 {
        self.vwap + self.std_dev * deviation
    }

    pub fn lower(&self, deviation: f64) -> f64 {
        self.vwap - self.std_dev * deviation
    }
}

fn effective_volume(bar: &Bar) -> f64 {
    if bar.volume > 0.0 { bar.volume } else { 1.0 }
}

pub fn vwap(bars: &[Bar], period: usize) -> Option<VwapBand> {
    let window = trailing(bars, period)?;

    let sum_volume: f64 = window.iter().map(effective_volume).sum();
    let sum_pv: f64 = window
        .iter()
        .map(|b| b.typical_price() * effective_volume(b))
        .sum();
    let vwap = sum_pv / sum_volume;

    let sum_sq: f64 = window
        .iter()
        .map(|b| {
            let diff = b.typical_price() - vwap;
            diff * diff * effective_volume(b)
        })
        .sum();

    Some(VwapBand {
        vwap,
        std_dev: (sum_sq / sum_volume).sqrt(),
    })
}
