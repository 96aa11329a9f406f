//! In-memory cache in front of another market data provider.
//!
//! The first request for a `(symbol, interval)` pair loads the full series
//! from the inner provider; later requests are served from memory and only
//! the range filter runs. Entries live as long as the cache value.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::domain::error::SignalbenchError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::{MarketDataPort, filter_range};

type SeriesKey = (String, String);

pub struct CachedDataPort<P> {
    inner: P,
    series: Mutex<HashMap<SeriesKey, Vec<Bar>>>,
}

impl<P: MarketDataPort> CachedDataPort<P> {
    pub fn new(inner: P) -> Self {
        CachedDataPort {
            inner,
            series: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_series(&self) -> usize {
        self.series.lock().map(|s| s.len()).unwrap_or(0)
    }

    fn full_series(&self, symbol: &str, interval: &str) -> Result<Vec<Bar>, SignalbenchError> {
        let key = (symbol.to_string(), interval.to_string());
        let mut series = self.series.lock().map_err(|_| SignalbenchError::Data {
            reason: "series cache lock poisoned".into(),
        })?;

        if let Some(bars) = series.get(&key) {
            debug!(symbol, interval, bars = bars.len(), "cache hit");
            return Ok(bars.clone());
        }

        let bars = self.inner.fetch_bars(symbol, interval, None, None)?;
        debug!(symbol, interval, bars = bars.len(), "cache populated");
        series.insert(key, bars.clone());
        Ok(bars)
    }
}

impl<P: MarketDataPort> MarketDataPort for CachedDataPort<P> {
    fn fetch_bars(
        &self,
        symbol: &str,
        interval: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Result<Vec<Bar>, SignalbenchError> {
        let bars = self.full_series(symbol, interval)?;
        let filtered = filter_range(&bars, from, to);
        if filtered.is_empty() && !bars.is_empty() {
            warn!(symbol, interval, ?from, ?to, "no cached bars inside requested range");
        }
        Ok(filtered)
    }

    fn list_symbols(&self, interval: &str) -> Result<Vec<String>, SignalbenchError> {
        self.inner.list_symbols(interval)
    }
}
