//! Average True Range and its normalised form.
//!
//! TR[0] = high - low, TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! ATR seed is the mean of the first n TR values, then Wilder smoothing:
//! ATR[i] = (ATR[i-1] * (n-1) + TR[i]) / n
//! NATR = ATR / close * 100
//! Warmup: first (n-1) values are NaN.

use crate::domain::indicator::nan_series;
use crate::domain::ohlcv::Ohlcv;
use crate::domain::series::Series;

pub fn atr(ohlcv: &Ohlcv, period: usize) -> Series {
    let len = ohlcv.len();
    let mut out = nan_series(len);
    if period == 0 || len < period {
        return out;
    }

    let tr: Vec<f64> = (0..len).map(|i| ohlcv.true_range(i)).collect();
    let mut atr = tr[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = atr;

    for i in period..len {
        atr = (atr * (period - 1) as f64 + tr[i]) / period as f64;
        out[i] = atr;
    }
    out
}

pub fn natr(ohlcv: &Ohlcv, period: usize) -> Series {
    atr(ohlcv, period)
        .iter()
        .zip(&ohlcv.close)
        .map(|(a, c)| if *c == 0.0 { 0.0 } else { a / c * 100.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_ohlcv(bars: &[(f64, f64, f64)]) -> Ohlcv {
        Ohlcv {
            open: bars.iter().map(|b| b.2).collect(),
            high: bars.iter().map(|b| b.0).collect(),
            low: bars.iter().map(|b| b.1).collect(),
            close: bars.iter().map(|b| b.2).collect(),
            volume: vec![1000.0; bars.len()],
        }
    }

    #[test]
    fn atr_warmup() {
        let ohlcv = make_ohlcv(&[(110.0, 90.0, 100.0); 5]);
        let out = atr(&ohlcv, 3);
        assert_eq!(out.len(), 5);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!(!out[2].is_nan());
    }

    #[test]
    fn atr_seed_is_average() {
        let ohlcv = make_ohlcv(&[
            (110.0, 100.0, 105.0),
            (115.0, 105.0, 110.0),
            (120.0, 110.0, 115.0),
        ]);
        assert_relative_eq!(atr(&ohlcv, 3)[2], 10.0);
    }

    #[test]
    fn atr_wilder_smoothing() {
        let ohlcv = make_ohlcv(&[
            (110.0, 100.0, 105.0),
            (115.0, 105.0, 110.0),
            (120.0, 110.0, 115.0),
            (125.0, 115.0, 120.0),
        ]);
        let expected = (10.0 * 2.0 + 10.0) / 3.0;
        assert_relative_eq!(atr(&ohlcv, 3)[3], expected);
    }

    #[test]
    fn atr_insufficient_bars() {
        let ohlcv = make_ohlcv(&[(110.0, 90.0, 100.0); 2]);
        let out = atr(&ohlcv, 5);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn natr_is_percent_of_close() {
        let ohlcv = make_ohlcv(&[(110.0, 90.0, 100.0); 4]);
        assert_relative_eq!(natr(&ohlcv, 2)[3], 20.0);
    }
}
