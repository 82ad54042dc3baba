//! RSI (Relative Strength Index).
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n values are NaN (need n price changes to compute initial average).

use crate::domain::indicator::{first_valid, nan_series};
use crate::domain::series::Series;

pub fn rsi(values: &[f64], period: usize) -> Series {
    let mut out = nan_series(values.len());
    let Some(start) = first_valid(values) else {
        return out;
    };
    if period == 0 || values.len() - start <= period {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in (start + 1)..values.len() {
        let change = values[i] - values[i - 1];
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        let n = i - start;

        if n <= period {
            avg_gain += gain / period as f64;
            avg_loss += loss / period as f64;
            if n < period {
                continue;
            }
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
        }

        out[i] = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        };
    }
    out
}
