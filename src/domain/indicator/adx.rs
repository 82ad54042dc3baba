//! ADX (Average Directional Index), Wilder.
//!
//! +DM = H[i]-H[i-1] when it exceeds L[i-1]-L[i] and is positive, else 0;
//! -DM symmetrically. TR, +DM and -DM are Wilder-summed over n
//! (first sum of n values, then S = S - S/n + x).
//! DX = 100 * |+DI - -DI| / (+DI + -DI), ADX = Wilder average of DX.
//! Warmup: first 2n-1 values are NaN.

use crate::domain::indicator::nan_series;
use crate::domain::ohlcv::Ohlcv;
use crate::domain::series::Series;

pub fn adx(ohlcv: &Ohlcv, period: usize) -> Series {
    let len = ohlcv.len();
    let mut out = nan_series(len);
    if period == 0 || len < 2 * period {
        return out;
    }

    let n = period as f64;
    let mut tr_sum = 0.0;
    let mut plus_sum = 0.0;
    let mut minus_sum = 0.0;
    let mut dx_sum = 0.0;
    let mut adx = 0.0;

    for i in 1..len {
        let up = ohlcv.high[i] - ohlcv.high[i - 1];
        let down = ohlcv.low[i - 1] - ohlcv.low[i];
        let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
        let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };
        let tr = ohlcv.true_range(i);

        if i <= period {
            tr_sum += tr;
            plus_sum += plus_dm;
            minus_sum += minus_dm;
            if i < period {
                continue;
            }
        } else {
            tr_sum = tr_sum - tr_sum / n + tr;
            plus_sum = plus_sum - plus_sum / n + plus_dm;
            minus_sum = minus_sum - minus_sum / n + minus_dm;
        }

        let dx = directional_index(tr_sum, plus_sum, minus_sum);

        // first DX at i == period, first ADX at i == 2n - 1
        if i < 2 * period - 1 {
            dx_sum += dx;
        } else if i == 2 * period - 1 {
            dx_sum += dx;
            adx = dx_sum / n;
            out[i] = adx;
        } else {
            adx = (adx * (n - 1.0) + dx) / n;
            out[i] = adx;
        }
    }
    out
}

fn directional_index(tr_sum: f64, plus_sum: f64, minus_sum: f64) -> f64 {
    if tr_sum == 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * plus_sum / tr_sum;
    let minus_di = 100.0 * minus_sum / tr_sum;
    let total = plus_di + minus_di;
    if total == 0.0 {
        0.0
    } else {
        100.0 * (plus_di - minus_di).abs() / total
    }
}
