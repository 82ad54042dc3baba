//! CryptoCompare HTTP market data adapter.
//!
//! Uses the `histominute` / `histohour` / `histoday` endpoints with the
//! aggregation factor derived from the entity interval.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::error::TickwatchError;
use crate::domain::interval::{Interval, Resolution};
use crate::domain::ohlcv::Tick;
use crate::ports::data_port::MarketDataPort;

pub const BASE_URL: &str = "https://min-api.cryptocompare.com/data";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct HistoResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Message", default)]
    message: String,
    // `[]` on success, sometimes `{}` on error
    #[serde(rename = "Data", default)]
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct Candle {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(rename = "volumefrom")]
    volume_from: f64,
    #[serde(rename = "volumeto")]
    volume_to: f64,
}

impl From<Candle> for Tick {
    fn from(c: Candle) -> Self {
        Tick {
            time: c.time,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume_from: c.volume_from,
            volume_to: c.volume_to,
        }
    }
}

pub struct CryptoCompareAdapter {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CryptoCompareAdapter {
    pub fn new(api_key: Option<String>) -> Result<Self, TickwatchError> {
        Self::with_base_url(BASE_URL, api_key)
    }

    pub fn with_base_url(base_url: &str, api_key: Option<String>) -> Result<Self, TickwatchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TickwatchError::ConfigInvalid {
                section: "data".to_string(),
                key: "source".to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(resolution: Resolution) -> &'static str {
        match resolution {
            Resolution::Minute => "histominute",
            Resolution::Hour => "histohour",
            Resolution::Day => "histoday",
        }
    }
}

impl MarketDataPort for CryptoCompareAdapter {
    fn fetch_ticks(
        &self,
        symbol: &str,
        currency: &str,
        interval: Interval,
        length: usize,
        exchange: &str,
    ) -> Result<Vec<Tick>, TickwatchError> {
        let fail = |reason: String| TickwatchError::Fetch {
            symbol: symbol.to_string(),
            currency: currency.to_string(),
            exchange: exchange.to_string(),
            reason,
        };

        let (resolution, aggregate) = interval.resolution();
        let url = format!("{}/{}", self.base_url, Self::endpoint(resolution));
        let aggregate = aggregate.to_string();
        let limit = length.to_string();

        let mut request = self.client.get(&url).query(&[
            ("fsym", symbol),
            ("tsym", currency),
            ("aggregate", aggregate.as_str()),
            ("limit", limit.as_str()),
            ("e", exchange),
        ]);
        if let Some(ref api_key) = self.api_key {
            request = request.header("Authorization", format!("Apikey {}", api_key));
        }

        tracing::debug!(%url, symbol, currency, exchange, %interval, length, "fetching ticks");
        let response = request
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| fail(e.to_string()))?;
        let body: HistoResponse = response.json().map_err(|e| fail(e.to_string()))?;

        if body.response != "Success" {
            return Err(fail(format!("{}: {}", body.response, body.message)));
        }

        let candles: Vec<Candle> =
            serde_json::from_value(body.data).map_err(|e| fail(e.to_string()))?;
        let mut ticks: Vec<Tick> = candles.into_iter().map(Tick::from).collect();
        ticks.sort_by(|a, b| b.time.cmp(&a.time));
        ticks.truncate(length);
        Ok(ticks)
    }
}
