//! Linear regression end-point over a rolling window.
//!
//! Fits y = a + b*x by least squares to the last n values (x = 0..n-1) and
//! returns the fitted value at x = n-1.
//! Warmup: first (n-1) values are NaN.

use crate::domain::indicator::nan_series;
use crate::domain::series::Series;

pub fn linearreg(values: &[f64], period: usize) -> Series {
    let mut out = nan_series(values.len());
    if period == 0 {
        return out;
    }
    if period == 1 {
        return values.to_vec();
    }

    let n = period as f64;
    let sum_x = n * (n - 1.0) / 2.0;
    let sum_x2 = (n - 1.0) * n * (2.0 * n - 1.0) / 6.0;
    let divisor = n * sum_x2 - sum_x * sum_x;

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let sum_y: f64 = window.iter().sum();
        let sum_xy: f64 = window
            .iter()
            .enumerate()
            .map(|(x, y)| x as f64 * y)
            .sum();
        let slope = (n * sum_xy - sum_x * sum_y) / divisor;
        let intercept = (sum_y - slope * sum_x) / n;
        out[i] = intercept + slope * (n - 1.0);
    }
    out
}
