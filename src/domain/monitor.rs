//! Monitor configuration model: what to watch and where to report.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::indicator::IndicatorSpec;
use crate::domain::interval::{Interval, Unit};
use crate::domain::notification::MessageFormat;
use crate::domain::rule::Rule;

pub const DEFAULT_EXCHANGE: &str = "CCCAGG";
pub const DEFAULT_LENGTH: usize = 100;
pub const DEFAULT_UPDATE: Duration = Duration::from_secs(60 * 60);

/// One watched market instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: String,
    pub name: String,
    pub coin: String,
    pub currency: String,
    pub exchange: String,
    pub interval: Interval,
    pub length: usize,
    /// Result names reported every cycle, regardless of rules.
    pub update: Vec<String>,
    pub indicators: Vec<IndicatorSpec>,
    pub rules: Vec<Rule>,
}

impl Entity {
    pub fn new(id: &str, coin: &str, currency: &str) -> Self {
        Self {
            id: id.to_string(),
            name: String::new(),
            coin: coin.to_string(),
            currency: currency.to_string(),
            exchange: DEFAULT_EXCHANGE.to_string(),
            interval: Interval {
                num: 1,
                unit: Unit::Hour,
            },
            length: DEFAULT_LENGTH,
            update: Vec::new(),
            indicators: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Display name, falling back to the id.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Notification source line, e.g. `Bitcoin 1H`.
    pub fn source(&self) -> String {
        format!("{} {}", self.label(), self.interval)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    CryptoCompare { api_key: Option<String> },
    Csv { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierKind {
    Console,
    Telegram {
        recipient: String,
        sender: String,
        auth: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierConfig {
    pub name: String,
    pub kind: NotifierKind,
    pub format: MessageFormat,
}

impl NotifierConfig {
    pub fn console() -> Self {
        Self {
            name: "console".to_string(),
            kind: NotifierKind::Console,
            format: MessageFormat::Normal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub update: Duration,
    pub verbose: bool,
    pub data: DataSource,
    pub entities: Vec<Entity>,
    pub global_rules: Vec<Rule>,
    pub notifiers: Vec<NotifierConfig>,
}

impl MonitorConfig {
    pub fn new(data: DataSource) -> Self {
        Self {
            update: DEFAULT_UPDATE,
            verbose: false,
            data,
            entities: Vec::new(),
            global_rules: Vec::new(),
            notifiers: vec![NotifierConfig::console()],
        }
    }

    pub fn rule_count(&self) -> usize {
        self.global_rules.len() + self.entities.iter().map(|e| e.rules.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_to_id() {
        let mut entity = Entity::new("btc", "BTC", "USD");
        assert_eq!(entity.label(), "btc");
        entity.name = "Bitcoin".into();
        assert_eq!(entity.label(), "Bitcoin");
        assert_eq!(entity.source(), "Bitcoin 1H");
    }

    #[test]
    fn rule_count_includes_global() {
        let mut config = MonitorConfig::new(DataSource::CryptoCompare { api_key: None });
        let mut entity = Entity::new("btc", "BTC", "USD");
        entity.rules.push(Rule::expression("dip", "close < 100"));
        config.entities.push(entity);
        config
            .global_rules
            .push(Rule::script("spread", "alert(false);"));
        assert_eq!(config.rule_count(), 2);
        assert_eq!(config.notifiers, vec![NotifierConfig::console()]);
    }
}
