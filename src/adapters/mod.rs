//! Concrete adapter implementations for ports.

pub mod console_notifier;
#[cfg(feature = "http")]
pub mod cryptocompare_adapter;
pub mod csv_adapter;
pub mod dispatcher;
pub mod file_config_adapter;
#[cfg(feature = "http")]
pub mod telegram_notifier;
