#![allow(dead_code)]

pub use signalbench::domain::ohlcv::Bar;
use signalbench::domain::error::SignalbenchError;
use signalbench::ports::data_port::{MarketDataPort, filter_range};
use std::cell::Cell;
use std::collections::HashMap;

pub const HOUR_MS: i64 = 3_600_000;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
    pub fetches: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        _interval: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Result<Vec<Bar>, SignalbenchError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SignalbenchError::Data {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(symbol).cloned().unwrap_or_default();
        Ok(filter_range(&bars, from, to))
    }

    fn list_symbols(&self, _interval: &str) -> Result<Vec<String>, SignalbenchError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Hourly bar with a one-point range around `close`.
pub fn make_bar(index: usize, close: f64) -> Bar {
    Bar {
        timestamp: index as i64 * HOUR_MS,
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 1000.0,
    }
}

/// Bar with every price field equal to `price`.
pub fn flat_bar(index: usize, price: f64) -> Bar {
    Bar {
        timestamp: index as i64 * HOUR_MS,
        open: price,
        high: price,
        low: price,
        close: price,
        volume: 1000.0,
    }
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| flat_bar(i, c))
        .collect()
}

/// Deterministic zig-zag series: a slow sine wave plus a faster ripple.
pub fn wave_bars(count: usize, base: f64) -> Vec<Bar> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            let close = base + 10.0 * (t / 15.0).sin() + 2.0 * (t / 3.0).cos();
            Bar {
                timestamp: i as i64 * HOUR_MS,
                open: close - 0.3,
                high: close + 1.2,
                low: close - 1.2,
                close,
                volume: 500.0 + (i % 7) as f64 * 100.0,
            }
        })
        .collect()
}

pub fn csv_content(bars: &[Bar]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}
