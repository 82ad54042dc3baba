//! Rolling highest / lowest value over n periods.
//! Warmup: first (n-1) valid values are NaN.

use crate::domain::indicator::{first_valid, nan_series};
use crate::domain::series::Series;

pub fn rolling_max(values: &[f64], period: usize) -> Series {
    rolling(values, period, f64::max)
}

pub fn rolling_min(values: &[f64], period: usize) -> Series {
    rolling(values, period, f64::min)
}

fn rolling(values: &[f64], period: usize, pick: fn(f64, f64) -> f64) -> Series {
    let mut out = nan_series(values.len());
    let Some(start) = first_valid(values) else {
        return out;
    };
    if period == 0 {
        return out;
    }

    for i in (start + period - 1)..values.len() {
        out[i] = values[i + 1 - period..=i]
            .iter()
            .copied()
            .reduce(pick)
            .unwrap_or(f64::NAN);
    }
    out
}
