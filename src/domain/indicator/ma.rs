//! Moving averages: SMA, EMA, DEMA, TEMA, WMA.
//!
//! All functions skip leading NaN input (so they can be chained on other
//! indicator outputs) and return a series of the input length with NaN warmup.
//!
//! EMA: k = 2/(n+1), seeded with the SMA of the first n valid values, then
//! EMA[i] = P[i]*k + EMA[i-1]*(1-k).

use crate::domain::indicator::{first_valid, nan_series};
use crate::domain::series::Series;

pub fn sma(values: &[f64], period: usize) -> Series {
    let mut out = nan_series(values.len());
    let Some(start) = first_valid(values) else {
        return out;
    };
    if period == 0 || values.len() - start < period {
        return out;
    }

    let mut sum = 0.0;
    for i in start..values.len() {
        sum += values[i];
        if i >= start + period {
            sum -= values[i - period];
        }
        if i + 1 >= start + period {
            out[i] = sum / period as f64;
        }
    }
    out
}

pub fn ema(values: &[f64], period: usize) -> Series {
    let mut out = nan_series(values.len());
    let Some(start) = first_valid(values) else {
        return out;
    };
    if period == 0 || values.len() - start < period {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let seed_end = start + period - 1;
    let mut ema = values[start..=seed_end].iter().sum::<f64>() / period as f64;
    out[seed_end] = ema;

    for i in (seed_end + 1)..values.len() {
        ema = values[i] * k + ema * (1.0 - k);
        out[i] = ema;
    }
    out
}

/// DEMA = 2*EMA - EMA(EMA)
pub fn dema(values: &[f64], period: usize) -> Series {
    let e1 = ema(values, period);
    let e2 = ema(&e1, period);
    e1.iter().zip(&e2).map(|(a, b)| 2.0 * a - b).collect()
}

/// TEMA = 3*EMA - 3*EMA(EMA) + EMA(EMA(EMA))
pub fn tema(values: &[f64], period: usize) -> Series {
    let e1 = ema(values, period);
    let e2 = ema(&e1, period);
    let e3 = ema(&e2, period);
    (0..values.len())
        .map(|i| 3.0 * e1[i] - 3.0 * e2[i] + e3[i])
        .collect()
}

/// O(n) sliding window WMA.
/// WMA(n) = (1*P[i-n+1] + 2*P[i-n+2] + ... + n*P[i]) / (n*(n+1)/2)
pub fn wma(values: &[f64], period: usize) -> Series {
    let mut out = nan_series(values.len());
    let Some(start) = first_valid(values) else {
        return out;
    };
    if period == 0 || values.len() - start < period {
        return out;
    }

    let divisor = (period * (period + 1)) as f64 / 2.0;
    let mut weighted_sum = 0.0;
    let mut window_sum = 0.0;

    for i in start..values.len() {
        let offset = i - start;
        if offset < period {
            weighted_sum += (offset + 1) as f64 * values[i];
            window_sum += values[i];
        } else {
            weighted_sum += period as f64 * values[i] - window_sum;
            window_sum += values[i] - values[i - period];
        }

        if offset + 1 >= period {
            out[i] = weighted_sum / divisor;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sma_warmup_and_values() {
        let out = sma(&[10.0, 20.0, 30.0, 40.0], 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert_relative_eq!(out[2], 20.0);
        assert_relative_eq!(out[3], 30.0);
    }

    #[test]
    fn sma_skips_leading_nan() {
        let out = sma(&[f64::NAN, 2.0, 4.0, 6.0], 2);
        assert!(out[1].is_nan());
        assert_relative_eq!(out[2], 3.0);
        assert_relative_eq!(out[3], 5.0);
    }

    #[test]
    fn ema_seed_is_sma() {
        let out = ema(&[10.0, 20.0, 30.0], 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert_relative_eq!(out[2], 20.0);
    }

    #[test]
    fn ema_recursive_calculation() {
        let out = ema(&[10.0, 20.0, 30.0, 40.0, 50.0], 3);
        let k = 2.0 / 4.0;
        let ema_3 = 40.0 * k + 20.0 * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);
        assert_relative_eq!(out[3], ema_3);
        assert_relative_eq!(out[4], ema_4);
    }

    #[test]
    fn ema_period_1_tracks_input() {
        let out = ema(&[10.0, 20.0, 30.0], 1);
        assert_eq!(out, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn ema_period_0_is_all_nan() {
        let out = ema(&[10.0, 20.0], 0);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn dema_and_tema_of_flat_series_are_flat() {
        let flat = vec![100.0; 20];
        let d = dema(&flat, 3);
        let t = tema(&flat, 3);
        assert_relative_eq!(d[19], 100.0);
        assert_relative_eq!(t[19], 100.0);
        // EMA(EMA) needs 2*(n-1) bars, EMA(EMA(EMA)) 3*(n-1)
        assert!(d[3].is_nan());
        assert!(!d[4].is_nan());
        assert!(t[5].is_nan());
        assert!(!t[6].is_nan());
    }

    #[test]
    fn wma_basic_calculation() {
        let out = wma(&[10.0, 20.0, 30.0, 40.0], 3);
        assert!(out[1].is_nan());
        assert_relative_eq!(out[2], (10.0 + 40.0 + 90.0) / 6.0);
        assert_relative_eq!(out[3], (20.0 + 60.0 + 120.0) / 6.0);
    }

    #[test]
    fn short_input_is_all_nan() {
        let out = sma(&[1.0, 2.0], 5);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
