//! Market data port trait.

use crate::domain::error::TickwatchError;
use crate::domain::interval::Interval;
use crate::domain::ohlcv::Tick;

pub trait MarketDataPort {
    /// Fetches the newest `length` ticks of `symbol` priced in `currency`,
    /// newest first.
    fn fetch_ticks(
        &self,
        symbol: &str,
        currency: &str,
        interval: Interval,
        length: usize,
        exchange: &str,
    ) -> Result<Vec<Tick>, TickwatchError>;
}
