//! CSV file market data adapter.
//!
//! One file per series: `<data_dir>/<SYMBOL>_<interval>.csv` with header
//! `timestamp,open,high,low,close[,volume]`, timestamps in epoch milliseconds.

use crate::domain::error::SignalbenchError;
use crate::domain::ohlcv::Bar;
use crate::ports::data_port::{MarketDataPort, filter_range};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    /// Absent column or empty field reads as a volume of 1.
    #[serde(default)]
    volume: Option<f64>,
}

impl From<CsvRow> for Bar {
    fn from(row: CsvRow) -> Self {
        Bar {
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume.unwrap_or(1.0),
        }
    }
}

pub struct CsvDataAdapter {
    data_dir: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.data_dir.join(format!("{}_{}.csv", symbol, interval))
    }

    /// Full series from disk, ascending with duplicate timestamps removed.
    fn load(&self, symbol: &str, interval: &str) -> Result<Vec<Bar>, SignalbenchError> {
        let path = self.csv_path(symbol, interval);
        let content = fs::read_to_string(&path).map_err(|e| SignalbenchError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let bar: Bar = result
                .map_err(|e| SignalbenchError::Data {
                    reason: format!("CSV parse error in {}: {}", path.display(), e),
                })?
                .into();
            if !bar.is_finite() {
                return Err(SignalbenchError::Data {
                    reason: format!(
                        "non-finite value in {} at record {}",
                        path.display(),
                        line + 1
                    ),
                });
            }
            bars.push(bar);
        }

        // Stable sort keeps file order among equal timestamps, so the first wins.
        bars.sort_by_key(|b| b.timestamp);
        let before = bars.len();
        bars.dedup_by_key(|b| b.timestamp);
        if bars.len() < before {
            debug!(
                symbol,
                interval,
                dropped = before - bars.len(),
                "dropped duplicate timestamps"
            );
        }

        debug!(
            symbol,
            interval,
            bars = bars.len(),
            first = ?bars.first().and_then(Bar::datetime),
            last = ?bars.last().and_then(Bar::datetime),
            path = %path.display(),
            "loaded series"
        );
        Ok(bars)
    }
}

impl MarketDataPort for CsvDataAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        interval: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Result<Vec<Bar>, SignalbenchError> {
        let bars = self.load(symbol, interval)?;
        let filtered = filter_range(&bars, from, to);
        if filtered.is_empty() && !bars.is_empty() {
            warn!(symbol, interval, ?from, ?to, "no bars inside requested range");
        }
        Ok(filtered)
    }

    fn list_symbols(&self, interval: &str) -> Result<Vec<String>, SignalbenchError> {
        let entries = fs::read_dir(&self.data_dir).map_err(|e| SignalbenchError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.data_dir.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", interval);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| SignalbenchError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(&suffix) {
                if !symbol.is_empty() {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HEADER: &str = "timestamp,open,high,low,close,volume\n";

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = format!(
            "{HEADER}\
            7200000,110.0,120.0,105.0,115.0,55000\n\
            0,100.0,110.0,90.0,105.0,50000\n\
            3600000,105.0,115.0,100.0,110.0,60000\n"
        );

        fs::write(path.join("BTCUSDT_1h.csv"), csv_content).unwrap();
        fs::write(path.join("ETHUSDT_1h.csv"), HEADER).unwrap();
        fs::write(path.join("BTCUSDT_1d.csv"), HEADER).unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_bars_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let bars = adapter.fetch_bars("BTCUSDT", "1h", None, None).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].timestamp, 0);
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000.0);
        assert_eq!(bars[2].timestamp, 7_200_000);
    }

    #[test]
    fn fetch_bars_filters_inclusively() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let bars = adapter
            .fetch_bars("BTCUSDT", "1h", Some(3_600_000), Some(3_600_000))
            .unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].timestamp, 3_600_000);
    }

    #[test]
    fn duplicate_timestamps_keep_first() {
        let dir = TempDir::new().unwrap();
        let content = format!("{HEADER}0,1,1,1,1,1\n0,2,2,2,2,2\n60000,3,3,3,3,3\n");
        fs::write(dir.path().join("X_1m.csv"), content).unwrap();
        let adapter = CsvDataAdapter::new(dir.path().to_path_buf());

        let bars = adapter.fetch_bars("X", "1m", None, None).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 1.0);
    }

    #[test]
    fn non_finite_value_is_rejected() {
        let dir = TempDir::new().unwrap();
        let content = format!("{HEADER}0,1,1,1,NaN,1\n");
        fs::write(dir.path().join("X_1m.csv"), content).unwrap();
        let adapter = CsvDataAdapter::new(dir.path().to_path_buf());

        let err = adapter.fetch_bars("X", "1m", None, None).unwrap_err();
        assert!(matches!(err, SignalbenchError::Data { .. }));
    }

    #[test]
    fn missing_volume_defaults_to_one() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("X_1m.csv"),
            "timestamp,open,high,low,close\n0,1,2,0.5,1.5\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("Y_1m.csv"),
            format!("{HEADER}0,1,2,0.5,1.5,\n60000,1,2,0.5,1.5,20\n"),
        )
        .unwrap();
        let adapter = CsvDataAdapter::new(dir.path().to_path_buf());

        let bars = adapter.fetch_bars("X", "1m", None, None).unwrap();
        assert_eq!(bars[0].volume, 1.0);
        assert_eq!(bars[0].close, 1.5);

        let bars = adapter.fetch_bars("Y", "1m", None, None).unwrap();
        assert_eq!(bars[0].volume, 1.0);
        assert_eq!(bars[1].volume, 20.0);
    }

    #[test]
    fn malformed_row_is_rejected() {
        let dir = TempDir::new().unwrap();
        let content = format!("{HEADER}0,1,1,1,abc,1\n");
        fs::write(dir.path().join("X_1m.csv"), content).unwrap();
        let adapter = CsvDataAdapter::new(dir.path().to_path_buf());

        assert!(adapter.fetch_bars("X", "1m", None, None).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let result = adapter.fetch_bars("XYZ", "1h", None, None);

        assert!(matches!(result, Err(SignalbenchError::Data { .. })));
    }

    #[test]
    fn list_symbols_by_interval() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let symbols = adapter.list_symbols("1h").unwrap();
        assert_eq!(symbols, vec!["BTCUSDT", "ETHUSDT"]);

        let symbols = adapter.list_symbols("1d").unwrap();
        assert_eq!(symbols, vec!["BTCUSDT"]);
    }

    #[test]
    fn data_range_reports_bounds() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let range = adapter.data_range("BTCUSDT", "1h").unwrap().unwrap();
        assert_eq!(range.first, 0);
        assert_eq!(range.last, 7_200_000);
        assert_eq!(range.bars, 3);

        assert_eq!(adapter.data_range("ETHUSDT", "1h").unwrap(), None);
    }
}
