//! Volume-based indicators: OBV and MFI.

use crate::domain::indicator::nan_series;
use crate::domain::ohlcv::Ohlcv;
use crate::domain::series::Series;

/// On-Balance Volume.
///
/// OBV[0] = volume[0]
/// If close[i] > close[i-1]: OBV[i] = OBV[i-1] + volume[i]
/// If close[i] < close[i-1]: OBV[i] = OBV[i-1] - volume[i]
/// If close[i] == close[i-1]: OBV[i] = OBV[i-1]
///
/// No warmup period.
pub fn obv(close: &[f64], volume: &[f64]) -> Series {
    let mut out = Vec::with_capacity(close.len());
    let mut obv = 0.0;

    for i in 0..close.len() {
        if i == 0 {
            obv = volume[0];
        } else if close[i] > close[i - 1] {
            obv += volume[i];
        } else if close[i] < close[i - 1] {
            obv -= volume[i];
        }
        out.push(obv);
    }
    out
}

/// Money Flow Index.
///
/// Raw flow = typical price * volume, classed positive or negative by the
/// direction of the typical price. MFI = 100 * pos(n) / (pos(n) + neg(n)),
/// 0 when there was no flow at all.
/// Warmup: first n values are NaN.
pub fn mfi(ohlcv: &Ohlcv, period: usize) -> Series {
    let len = ohlcv.len();
    let mut out = nan_series(len);
    if period == 0 || len <= period {
        return out;
    }

    let mut positive = vec![0.0; len];
    let mut negative = vec![0.0; len];
    for i in 1..len {
        let tp = ohlcv.typical_price(i);
        let prev_tp = ohlcv.typical_price(i - 1);
        let flow = tp * ohlcv.volume[i];
        if tp > prev_tp {
            positive[i] = flow;
        } else if tp < prev_tp {
            negative[i] = flow;
        }
    }

    for i in period..len {
        let pos: f64 = positive[i + 1 - period..=i].iter().sum();
        let neg: f64 = negative[i + 1 - period..=i].iter().sum();
        out[i] = if pos + neg == 0.0 {
            0.0
        } else {
            100.0 * pos / (pos + neg)
        };
    }
    out
}
