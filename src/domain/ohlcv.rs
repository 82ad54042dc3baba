//! OHLCV tick representation.

use crate::domain::series::{reverse, Series};

/// One sample as delivered by the market data fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume_from: f64,
    pub volume_to: f64,
}

/// Five aligned chronological series for one entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ohlcv {
    pub open: Series,
    pub high: Series,
    pub low: Series,
    pub close: Series,
    pub volume: Series,
}

impl Ohlcv {
    /// Builds chronological series from newest-first ticks.
    pub fn from_ticks(ticks: &[Tick]) -> Self {
        let column = |f: fn(&Tick) -> f64| -> Series {
            let as_fetched: Series = ticks.iter().map(f).collect();
            reverse(&as_fetched)
        };
        Self {
            open: column(|t| t.open),
            high: column(|t| t.high),
            low: column(|t| t.low),
            close: column(|t| t.close),
            volume: column(|t| t.volume_from),
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// The five named series in population order.
    pub fn named(&self) -> [(&'static str, &Series); 5] {
        [
            ("open", &self.open),
            ("high", &self.high),
            ("low", &self.low),
            ("close", &self.close),
            ("volume", &self.volume),
        ]
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self, i: usize) -> f64 {
        (self.high[i] + self.low[i] + self.close[i]) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, i: usize) -> f64 {
        let hl = self.high[i] - self.low[i];
        if i == 0 {
            return hl;
        }
        let prev_close = self.close[i - 1];
        let hc = (self.high[i] - prev_close).abs();
        let lc = (self.low[i] - prev_close).abs();
        hl.max(hc).max(lc)
    }
}
