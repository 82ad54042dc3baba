//! Technical indicator pipeline.
//!
//! This module provides:
//! - `IndicatorSpec`: user declaration (variable name, kind, integer parameters)
//! - `IndicatorKind`: enum for indicator identity + resolved parameters
//! - `IndicatorOutput`: one named output series of a computed indicator
//! - `compute`: dispatch from spec to the individual calculations
//!
//! All outputs are chronological and have the input length. Undefined warmup
//! values are `f64::NAN`.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod extrema;
pub mod linearreg;
pub mod ma;
pub mod macd;
pub mod obv;
pub mod roc;
pub mod rsi;
pub mod stddev;
pub mod stochastic;

use crate::domain::ohlcv::Ohlcv;
use crate::domain::series::Series;
use std::fmt;

pub const DEFAULT_PERIOD: usize = 14;

/// Kinds accepted in configuration, in documentation order.
pub const SUPPORTED_KINDS: &[&str] = &[
    "sma", "ema", "dema", "tema", "wma", "rsi", "stochrsi", "stoch", "macd", "mom", "roc",
    "mfi", "adx", "obv", "atr", "natr", "linearreg", "max", "min", "stddev", "bbands",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorSpec {
    pub name: String,
    pub kind: String,
    pub params: Vec<usize>,
}

impl IndicatorSpec {
    pub fn new(name: &str, kind: &str, params: &[usize]) -> Self {
        Self {
            name: name.to_string(),
            kind: kind.to_string(),
            params: params.to_vec(),
        }
    }

    fn param(&self, index: usize, default: usize) -> usize {
        self.params.get(index).copied().unwrap_or(default)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma(usize),
    Ema(usize),
    Dema(usize),
    Tema(usize),
    Wma(usize),
    Rsi(usize),
    StochRsi {
        period: usize,
        fast_k: usize,
        fast_d: usize,
    },
    Stoch {
        fast_k: usize,
        slow_k: usize,
        slow_d: usize,
    },
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Mom(usize),
    Roc(usize),
    Mfi(usize),
    Adx(usize),
    Obv,
    Atr(usize),
    Natr(usize),
    LinearReg(usize),
    Max(usize),
    Min(usize),
    Stddev(usize),
    Bollinger {
        period: usize,
        multiplier: usize,
    },
}

impl IndicatorKind {
    /// Resolves a spec to a kind. `None` for kinds this pipeline does not know.
    pub fn from_spec(spec: &IndicatorSpec) -> Option<Self> {
        let p = |i, d| spec.param(i, d);
        let kind = match spec.kind.to_ascii_lowercase().as_str() {
            "sma" => IndicatorKind::Sma(p(0, DEFAULT_PERIOD)),
            "ema" => IndicatorKind::Ema(p(0, DEFAULT_PERIOD)),
            "dema" => IndicatorKind::Dema(p(0, DEFAULT_PERIOD)),
            "tema" => IndicatorKind::Tema(p(0, DEFAULT_PERIOD)),
            "wma" => IndicatorKind::Wma(p(0, DEFAULT_PERIOD)),
            "rsi" => IndicatorKind::Rsi(p(0, DEFAULT_PERIOD)),
            "stochrsi" => IndicatorKind::StochRsi {
                period: p(0, DEFAULT_PERIOD),
                fast_k: p(1, 5),
                fast_d: p(2, 3),
            },
            "stoch" => IndicatorKind::Stoch {
                fast_k: p(0, 5),
                slow_k: p(1, 3),
                slow_d: p(2, 3),
            },
            "macd" => IndicatorKind::Macd {
                fast: p(0, macd::DEFAULT_FAST),
                slow: p(1, macd::DEFAULT_SLOW),
                signal: p(2, macd::DEFAULT_SIGNAL),
            },
            "mom" => IndicatorKind::Mom(p(0, 10)),
            "roc" => IndicatorKind::Roc(p(0, 10)),
            "mfi" => IndicatorKind::Mfi(p(0, DEFAULT_PERIOD)),
            "adx" => IndicatorKind::Adx(p(0, DEFAULT_PERIOD)),
            "obv" => IndicatorKind::Obv,
            "atr" => IndicatorKind::Atr(p(0, DEFAULT_PERIOD)),
            "natr" => IndicatorKind::Natr(p(0, DEFAULT_PERIOD)),
            "linearreg" => IndicatorKind::LinearReg(p(0, DEFAULT_PERIOD)),
            "max" => IndicatorKind::Max(p(0, 30)),
            "min" => IndicatorKind::Min(p(0, 30)),
            "stddev" => IndicatorKind::Stddev(p(0, bollinger::DEFAULT_PERIOD)),
            "bbands" => IndicatorKind::Bollinger {
                period: p(0, bollinger::DEFAULT_PERIOD),
                multiplier: p(1, bollinger::DEFAULT_MULTIPLIER),
            },
            _ => return None,
        };
        Some(kind)
    }

    /// Output suffixes in the order `compute` returns them.
    pub fn suffixes(&self) -> &'static [&'static str] {
        match self {
            IndicatorKind::StochRsi { .. } | IndicatorKind::Stoch { .. } => &["_K", "_D"],
            IndicatorKind::Macd { .. } => &["", "_Sig", "_Hist"],
            IndicatorKind::Bollinger { .. } => &["_Upper", "", "_Lower"],
            _ => &[""],
        }
    }

    fn calculate(&self, ohlcv: &Ohlcv) -> Vec<Series> {
        let close = &ohlcv.close;
        match *self {
            IndicatorKind::Sma(n) => vec![ma::sma(close, n)],
            IndicatorKind::Ema(n) => vec![ma::ema(close, n)],
            IndicatorKind::Dema(n) => vec![ma::dema(close, n)],
            IndicatorKind::Tema(n) => vec![ma::tema(close, n)],
            IndicatorKind::Wma(n) => vec![ma::wma(close, n)],
            IndicatorKind::Rsi(n) => vec![rsi::rsi(close, n)],
            IndicatorKind::StochRsi {
                period,
                fast_k,
                fast_d,
            } => {
                let s = stochastic::stoch_rsi(close, period, fast_k, fast_d);
                vec![s.k, s.d]
            }
            IndicatorKind::Stoch {
                fast_k,
                slow_k,
                slow_d,
            } => {
                let s = stochastic::stoch(&ohlcv.high, &ohlcv.low, close, fast_k, slow_k, slow_d);
                vec![s.k, s.d]
            }
            IndicatorKind::Macd { fast, slow, signal } => {
                let m = macd::macd(close, fast, slow, signal);
                vec![m.line, m.signal, m.histogram]
            }
            IndicatorKind::Mom(n) => vec![roc::mom(close, n)],
            IndicatorKind::Roc(n) => vec![roc::roc(close, n)],
            IndicatorKind::Mfi(n) => vec![obv::mfi(ohlcv, n)],
            IndicatorKind::Adx(n) => vec![adx::adx(ohlcv, n)],
            IndicatorKind::Obv => vec![obv::obv(close, &ohlcv.volume)],
            IndicatorKind::Atr(n) => vec![atr::atr(ohlcv, n)],
            IndicatorKind::Natr(n) => vec![atr::natr(ohlcv, n)],
            IndicatorKind::LinearReg(n) => vec![linearreg::linearreg(close, n)],
            IndicatorKind::Max(n) => vec![extrema::rolling_max(close, n)],
            IndicatorKind::Min(n) => vec![extrema::rolling_min(close, n)],
            IndicatorKind::Stddev(n) => vec![stddev::stddev(close, n)],
            IndicatorKind::Bollinger { period, multiplier } => {
                let b = bollinger::bollinger(close, period, multiplier as f64);
                vec![b.upper, b.middle, b.lower]
            }
        }
    }
}

/// One output series of an indicator, addressed as `<spec name><suffix>`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorOutput {
    pub suffix: &'static str,
    pub series: Series,
}

/// Computes every output of `spec` over chronological `ohlcv`.
///
/// An unknown kind yields no outputs.
pub fn compute(ohlcv: &Ohlcv, spec: &IndicatorSpec) -> Vec<IndicatorOutput> {
    let Some(kind) = IndicatorKind::from_spec(spec) else {
        tracing::debug!(name = %spec.name, kind = %spec.kind, "unknown indicator kind, no outputs");
        return Vec::new();
    };

    kind.suffixes()
        .iter()
        .copied()
        .zip(kind.calculate(ohlcv))
        .map(|(suffix, series)| IndicatorOutput { suffix, series })
        .collect()
}

pub(crate) fn nan_series(len: usize) -> Series {
    vec![f64::NAN; len]
}

pub(crate) fn first_valid(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_nan())
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sma(n) => write!(f, "SMA({})", n),
            IndicatorKind::Ema(n) => write!(f, "EMA({})", n),
            IndicatorKind::Dema(n) => write!(f, "DEMA({})", n),
            IndicatorKind::Tema(n) => write!(f, "TEMA({})", n),
            IndicatorKind::Wma(n) => write!(f, "WMA({})", n),
            IndicatorKind::Rsi(n) => write!(f, "RSI({})", n),
            IndicatorKind::StochRsi {
                period,
                fast_k,
                fast_d,
            } => write!(f, "STOCHRSI({},{},{})", period, fast_k, fast_d),
            IndicatorKind::Stoch {
                fast_k,
                slow_k,
                slow_d,
            } => write!(f, "STOCH({},{},{})", fast_k, slow_k, slow_d),
            IndicatorKind::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorKind::Mom(n) => write!(f, "MOM({})", n),
            IndicatorKind::Roc(n) => write!(f, "ROC({})", n),
            IndicatorKind::Mfi(n) => write!(f, "MFI({})", n),
            IndicatorKind::Adx(n) => write!(f, "ADX({})", n),
            IndicatorKind::Obv => write!(f, "OBV"),
            IndicatorKind::Atr(n) => write!(f, "ATR({})", n),
            IndicatorKind::Natr(n) => write!(f, "NATR({})", n),
            IndicatorKind::LinearReg(n) => write!(f, "LINEARREG({})", n),
            IndicatorKind::Max(n) => write!(f, "MAX({})", n),
            IndicatorKind::Min(n) => write!(f, "MIN({})", n),
            IndicatorKind::Stddev(n) => write!(f, "STDDEV({})", n),
            IndicatorKind::Bollinger { period, multiplier } => {
                write!(f, "BBANDS({},{})", period, multiplier)
            }
        }
    }
}
