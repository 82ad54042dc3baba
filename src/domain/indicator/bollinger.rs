//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2
//! Warmup: first (period-1) values are NaN.

use crate::domain::indicator::nan_series;
use crate::domain::indicator::stddev::window_stddev;
use crate::domain::series::Series;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: usize = 2;

pub struct Bands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

pub fn bollinger(values: &[f64], period: usize, multiplier: f64) -> Bands {
    let len = values.len();
    let mut bands = Bands {
        upper: nan_series(len),
        middle: nan_series(len),
        lower: nan_series(len),
    };
    if period == 0 {
        return bands;
    }

    for i in (period - 1)..len {
        let (middle, stddev) = window_stddev(&values[i + 1 - period..=i]);
        bands.upper[i] = middle + multiplier * stddev;
        bands.middle[i] = middle;
        bands.lower[i] = middle - multiplier * stddev;
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn bollinger_symmetric_around_middle() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 + (i % 5) as f64).collect();
        let bands = bollinger(&values, 20, 2.0);
        for i in 19..30 {
            assert_relative_eq!(
                bands.upper[i] - bands.middle[i],
                bands.middle[i] - bands.lower[i],
                epsilon = 1e-9
            );
        }
        assert!(bands.middle[18].is_nan());
    }

    #[test]
    fn bollinger_flat_prices_collapse() {
        let bands = bollinger(&[100.0; 5], 3, 2.0);
        assert_relative_eq!(bands.upper[4], 100.0);
        assert_relative_eq!(bands.lower[4], 100.0);
    }

    #[test]
    fn bollinger_known_width() {
        // mean 5, population stddev 2
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let bands = bollinger(&values, 8, 2.0);
        assert_relative_eq!(bands.middle[7], 5.0);
        assert_relative_eq!(bands.upper[7], 9.0);
        assert_relative_eq!(bands.lower[7], 1.0);
    }
}
