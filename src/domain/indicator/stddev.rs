//! Standard Deviation indicator.
//!
//! Population standard deviation over n values.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) values are NaN.

use crate::domain::indicator::nan_series;
use crate::domain::series::Series;

pub fn stddev(values: &[f64], period: usize) -> Series {
    let mut out = nan_series(values.len());
    if period == 0 {
        return out;
    }

    for i in (period - 1)..values.len() {
        out[i] = window_stddev(&values[i + 1 - period..=i]).1;
    }
    out
}

/// (mean, population stddev) of a window.
pub(crate) fn window_stddev(window: &[f64]) -> (f64, f64) {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn stddev_warmup() {
        let out = stddev(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!(!out[2].is_nan());
    }

    #[test]
    fn stddev_constant_prices_is_zero() {
        let out = stddev(&[50.0; 5], 3);
        assert_eq!(out[4], 0.0);
    }

    #[test]
    fn stddev_known_values() {
        // population stddev of 2,4,4,4,5,5,7,9 is 2
        let out = stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        assert_relative_eq!(out[7], 2.0);
    }

    #[test]
    fn stddev_period_longer_than_input() {
        let out = stddev(&[1.0, 2.0], 3);
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
