//! CSV file market data adapter for offline replay.
//!
//! Reads `<base>/<coin>_<currency>_<exchange>.csv` with the header
//! `time,open,high,low,close,volumefrom,volumeto`. Rows may be in any order;
//! the file is assumed to already be at the entity's interval.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::error::TickwatchError;
use crate::domain::interval::Interval;
use crate::domain::ohlcv::Tick;
use crate::ports::data_port::MarketDataPort;

#[derive(Debug, Deserialize)]
struct CsvRow {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volumefrom: f64,
    volumeto: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, currency: &str, exchange: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_{}_{}.csv", symbol, currency, exchange))
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_ticks(
        &self,
        symbol: &str,
        currency: &str,
        _interval: Interval,
        length: usize,
        exchange: &str,
    ) -> Result<Vec<Tick>, TickwatchError> {
        let fail = |reason: String| TickwatchError::Fetch {
            symbol: symbol.to_string(),
            currency: currency.to_string(),
            exchange: exchange.to_string(),
            reason,
        };

        let path = self.csv_path(symbol, currency, exchange);
        let content = fs::read_to_string(&path)
            .map_err(|e| fail(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut ticks = Vec::new();
        for result in rdr.deserialize::<CsvRow>() {
            let row = result.map_err(|e| fail(format!("CSV parse error: {}", e)))?;
            ticks.push(Tick {
                time: row.time,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume_from: row.volumefrom,
                volume_to: row.volumeto,
            });
        }

        ticks.sort_by(|a, b| b.time.cmp(&a.time));
        ticks.truncate(length);
        tracing::debug!(path = %path.display(), ticks = ticks.len(), "loaded ticks");
        Ok(ticks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "time,open,high,low,close,volumefrom,volumeto\n\
            1700000000,100.0,110.0,90.0,105.0,50.0,5000.0\n\
            1700003600,105.0,115.0,100.0,110.0,60.0,6600.0\n\
            1700007200,110.0,120.0,105.0,115.0,55.0,6325.0\n";

        fs::write(path.join("BTC_USD_CCCAGG.csv"), csv_content).unwrap();
        fs::write(
            path.join("ETH_USD_CCCAGG.csv"),
            "time,open,high,low,close,volumefrom,volumeto\n",
        )
        .unwrap();

        (dir, path)
    }

    fn hourly() -> Interval {
        "1H".parse().unwrap()
    }

    #[test]
    fn fetch_ticks_returns_newest_first() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let ticks = adapter
            .fetch_ticks("BTC", "USD", hourly(), 10, "CCCAGG")
            .unwrap();

        assert_eq!(ticks.len(), 3);
        assert_eq!(ticks[0].time, 1700007200);
        assert_eq!(ticks[0].close, 115.0);
        assert_eq!(ticks[2].open, 100.0);
        assert_eq!(ticks[2].volume_from, 50.0);
        assert_eq!(ticks[2].volume_to, 5000.0);
    }

    #[test]
    fn fetch_ticks_keeps_newest_length_rows() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let ticks = adapter
            .fetch_ticks("BTC", "USD", hourly(), 2, "CCCAGG")
            .unwrap();

        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[1].time, 1700003600);
    }

    #[test]
    fn fetch_ticks_empty_file_gives_no_ticks() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let ticks = adapter
            .fetch_ticks("ETH", "USD", hourly(), 10, "CCCAGG")
            .unwrap();
        assert!(ticks.is_empty());
    }

    #[test]
    fn fetch_ticks_missing_file_is_fetch_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter
            .fetch_ticks("XYZ", "USD", hourly(), 10, "CCCAGG")
            .unwrap_err();
        assert!(matches!(err, TickwatchError::Fetch { ref symbol, .. } if symbol == "XYZ"));
    }

    #[test]
    fn fetch_ticks_bad_row_is_fetch_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BTC_USD_CCCAGG.csv"),
            "time,open,high,low,close,volumefrom,volumeto\n1,abc,1,1,1,1,1\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());
        assert!(adapter
            .fetch_ticks("BTC", "USD", hourly(), 10, "CCCAGG")
            .is_err());
    }
}
