//! Market data port.

use crate::domain::error::SignalbenchError;
use crate::domain::ohlcv::Bar;

/// Inclusive bounds and bar count of the stored series for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRange {
    pub first: i64,
    pub last: i64,
    pub bars: usize,
}

pub trait MarketDataPort {
    /// Bars for `symbol` at `interval`, ascending and deduplicated by
    /// timestamp, restricted to `[from, to]` (epoch milliseconds, inclusive)
    /// when bounds are given.
    fn fetch_bars(
        &self,
        symbol: &str,
        interval: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Result<Vec<Bar>, SignalbenchError>;

    fn list_symbols(&self, interval: &str) -> Result<Vec<String>, SignalbenchError>;

    fn data_range(
        &self,
        symbol: &str,
        interval: &str,
    ) -> Result<Option<DataRange>, SignalbenchError> {
        let bars = self.fetch_bars(symbol, interval, None, None)?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some(DataRange {
                first: first.timestamp,
                last: last.timestamp,
                bars: bars.len(),
            }),
            _ => None,
        })
    }
}

/// Keep bars whose timestamp lies in `[from, to]`.
pub fn filter_range(bars: &[Bar], from: Option<i64>, to: Option<i64>) -> Vec<Bar> {
    bars.iter()
        .filter(|b| from.is_none_or(|f| b.timestamp >= f) && to.is_none_or(|t| b.timestamp <= t))
        .copied()
        .collect()
}
