//! Time series helpers.
//!
//! Data arrives newest-first from the fetcher. Everything past ingest works on
//! chronological (oldest-first) series, where the latest sample is the last element.

use crate::domain::error::TickwatchError;

pub type Series = Vec<f64>;

/// Returns a copy of `series` with the element order inverted.
pub fn reverse(series: &[f64]) -> Series {
    series.iter().rev().copied().collect()
}

/// Most recent sample of a chronological series.
pub fn latest(name: &str, series: &[f64]) -> Result<f64, TickwatchError> {
    series
        .last()
        .copied()
        .ok_or_else(|| TickwatchError::EmptySeries {
            name: name.to_string(),
        })
}
