//! Stochastic oscillators.
//!
//! STOCH: raw %K = 100 * (C - LL(n)) / (HH(n) - LL(n)) over the fast-K window,
//! slow %K = SMA(raw %K, slow-K), %D = SMA(slow %K, slow-D).
//!
//! STOCHRSI: the same raw %K applied to RSI(n) instead of price, with
//! %D = SMA(%K, fast-D).
//!
//! A flat window (HH == LL) yields 0.

use crate::domain::indicator::extrema::{rolling_max, rolling_min};
use crate::domain::indicator::ma::sma;
use crate::domain::indicator::rsi::rsi;
use crate::domain::series::Series;

pub struct Stochastic {
    pub k: Series,
    pub d: Series,
}

pub fn stoch(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    fast_k: usize,
    slow_k: usize,
    slow_d: usize,
) -> Stochastic {
    let highest = rolling_max(high, fast_k);
    let lowest = rolling_min(low, fast_k);
    let raw_k = percent_k(close, &highest, &lowest);
    let k = sma(&raw_k, slow_k);
    let d = sma(&k, slow_d);
    Stochastic { k, d }
}

pub fn stoch_rsi(close: &[f64], period: usize, fast_k: usize, fast_d: usize) -> Stochastic {
    let r = rsi(close, period);
    let highest = rolling_max(&r, fast_k);
    let lowest = rolling_min(&r, fast_k);
    let k = percent_k(&r, &highest, &lowest);
    let d = sma(&k, fast_d);
    Stochastic { k, d }
}

fn percent_k(values: &[f64], highest: &[f64], lowest: &[f64]) -> Series {
    values
        .iter()
        .zip(highest.iter().zip(lowest))
        .map(|(v, (hh, ll))| {
            let range = hh - ll;
            if range.is_nan() {
                f64::NAN
            } else if range == 0.0 {
                0.0
            } else {
                100.0 * (v - ll) / range
            }
        })
        .collect()
}
