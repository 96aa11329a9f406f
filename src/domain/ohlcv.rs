//! OHLCV bar representation.

use chrono::{DateTime, Utc};

use super::error::SignalbenchError;

/// One candle. `timestamp` is the bar open time in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Closing prices of a bar slice, oldest first.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Check the series invariant: strictly ascending timestamps, finite fields.
pub fn validate_series(bars: &[Bar]) -> Result<(), SignalbenchError> {
    if let Some(bar) = bars.iter().find(|b| !b.is_finite()) {
        return Err(SignalbenchError::InvalidBars {
            reason: format!("non-finite field in bar at {}", bar.timestamp),
        });
    }
    if let Some(w) = bars.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
        return Err(SignalbenchError::InvalidBars {
            reason: format!(
                "timestamps not strictly ascending ({} then {})",
                w[0].timestamp, w[1].timestamp
            ),
        });
    }
    Ok(())
}
