//! Momentum and rate of change.
//!
//! MOM(n)[i] = C[i] - C[i-n]
//! ROC(n)[i] = ((C[i] - C[i-n]) / C[i-n]) * 100
//! If C[i-n] == 0: ROC = 0
//! Warmup: first n values are NaN.

use crate::domain::indicator::nan_series;
use crate::domain::series::Series;

pub fn mom(values: &[f64], period: usize) -> Series {
    lagged(values, period, |curr, prev| curr - prev)
}

pub fn roc(values: &[f64], period: usize) -> Series {
    lagged(values, period, |curr, prev| {
        if prev == 0.0 {
            0.0
        } else {
            ((curr - prev) / prev) * 100.0
        }
    })
}

fn lagged(values: &[f64], period: usize, f: impl Fn(f64, f64) -> f64) -> Series {
    let mut out = nan_series(values.len());
    if period == 0 {
        return out;
    }
    for i in period..values.len() {
        out[i] = f(values[i], values[i - period]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roc_warmup() {
        let out = roc(&[100.0, 110.0, 121.0], 1);
        assert!(out[0].is_nan());
        assert!((out[1] - 10.0).abs() < 1e-9);
        assert!((out[2] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn roc_zero_previous_is_zero() {
        let out = roc(&[0.0, 50.0], 1);
        assert_eq!(out[1], 0.0);
    }

    #[test]
    fn roc_negative_change() {
        let out = roc(&[100.0, 105.0, 90.0], 2);
        assert!((out[2] - (-10.0)).abs() < 1e-9);
    }

    #[test]
    fn mom_is_difference() {
        let out = mom(&[10.0, 12.0, 15.0, 11.0], 2);
        assert!(out[1].is_nan());
        assert_eq!(out[2], 5.0);
        assert_eq!(out[3], -1.0);
    }

    #[test]
    fn zero_period_is_all_nan() {
        assert!(mom(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }
}
