#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use tickwatch::domain::error::TickwatchError;
use tickwatch::domain::interval::Interval;
use tickwatch::domain::monitor::{DataSource, Entity, MonitorConfig};
use tickwatch::domain::notification::Notification;
pub use tickwatch::domain::ohlcv::Tick;
use tickwatch::domain::rule::Rule;
use tickwatch::ports::data_port::MarketDataPort;
use tickwatch::ports::notify_port::NotifyPort;

/// Serves one queued tick set per fetch; the last set repeats once the
/// queue is down to it.
pub struct MockMarketData {
    pub data: RefCell<HashMap<String, VecDeque<Vec<Tick>>>>,
    pub errors: HashMap<String, String>,
    pub fetches: RefCell<Vec<String>>,
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            data: RefCell::new(HashMap::new()),
            errors: HashMap::new(),
            fetches: RefCell::new(Vec::new()),
        }
    }

    /// Queues `closes` (chronological) as the next cycle's data for `symbol`.
    pub fn with_closes(self, symbol: &str, closes: &[f64]) -> Self {
        self.data
            .borrow_mut()
            .entry(symbol.to_string())
            .or_default()
            .push_back(make_ticks(closes));
        self
    }

    pub fn with_ticks(self, symbol: &str, ticks: Vec<Tick>) -> Self {
        self.data
            .borrow_mut()
            .entry(symbol.to_string())
            .or_default()
            .push_back(ticks);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl MarketDataPort for MockMarketData {
    fn fetch_ticks(
        &self,
        symbol: &str,
        currency: &str,
        _interval: Interval,
        length: usize,
        exchange: &str,
    ) -> Result<Vec<Tick>, TickwatchError> {
        self.fetches.borrow_mut().push(symbol.to_string());
        if let Some(reason) = self.errors.get(symbol) {
            return Err(TickwatchError::Fetch {
                symbol: symbol.to_string(),
                currency: currency.to_string(),
                exchange: exchange.to_string(),
                reason: reason.clone(),
            });
        }
        let mut data = self.data.borrow_mut();
        let queue = data.entry(symbol.to_string()).or_default();
        let ticks = if queue.len() > 1 {
            queue.pop_front().unwrap_or_default()
        } else {
            queue.front().cloned().unwrap_or_default()
        };
        Ok(ticks.into_iter().take(length).collect())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.borrow().iter().map(|n| n.message.clone()).collect()
    }

    pub fn count(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl NotifyPort for RecordingNotifier {
    fn send(&self, notification: &Notification) -> Result<(), TickwatchError> {
        self.sent.borrow_mut().push(notification.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

pub struct FailingNotifier;

impl NotifyPort for FailingNotifier {
    fn send(&self, _notification: &Notification) -> Result<(), TickwatchError> {
        Err(TickwatchError::Delivery {
            notifier: "failing".into(),
            reason: "offline".into(),
        })
    }
}

pub fn make_tick(time: i64, close: f64) -> Tick {
    Tick {
        time,
        open: close - 1.0,
        high: close + 2.0,
        low: close - 2.0,
        close,
        volume_from: 1000.0,
        volume_to: 1000.0 * close,
    }
}

/// Builds newest-first ticks from chronological closes, one hour apart.
pub fn make_ticks(closes: &[f64]) -> Vec<Tick> {
    closes
        .iter()
        .enumerate()
        .rev()
        .map(|(i, &close)| make_tick(1_700_000_000 + 3600 * i as i64, close))
        .collect()
}

/// Chronological closes rising by `step` from `start`.
pub fn rising(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

pub fn entity(id: &str, coin: &str, rules: Vec<Rule>) -> Entity {
    let mut entity = Entity::new(id, coin, "USD");
    entity.rules = rules;
    entity
}

pub fn config(entities: Vec<Entity>, global_rules: Vec<Rule>) -> MonitorConfig {
    let mut config = MonitorConfig::new(DataSource::CryptoCompare { api_key: None });
    config.entities = entities;
    config.global_rules = global_rules;
    config
}
