//! Builds a `MonitorConfig` from configuration sections.
//!
//! Layout:
//! - `[monitor]`: `update`, `verbose`, `pairs`, `watchers`, `notifiers`
//! - `[data]`: `source` (`cryptocompare` | `csv`), `path`, `api_key`
//! - `[pair.<id>]`: one entity
//! - `[watcher.<id>.<name>]` / `[watcher.global.<name>]`: one rule
//! - `[notifier.<name>]`: one delivery target
//!
//! Every rule is parsed or compiled here, so a config that loads cleanly
//! cannot fail a cycle on syntax.

use std::path::PathBuf;

use crate::domain::debounce::GLOBAL_ENTITY;
use crate::domain::error::TickwatchError;
use crate::domain::evaluator::RuleEvaluator;
use crate::domain::indicator::IndicatorSpec;
use crate::domain::interval::{parse_period, Interval};
use crate::domain::monitor::{
    DataSource, Entity, MonitorConfig, NotifierConfig, NotifierKind, DEFAULT_EXCHANGE,
    DEFAULT_LENGTH, DEFAULT_UPDATE,
};
use crate::domain::notification::MessageFormat;
use crate::domain::rule::{Rule, RuleCode};
use crate::ports::config_port::ConfigPort;

const MONITOR: &str = "monitor";
const DATA: &str = "data";

fn missing(section: &str, key: &str) -> TickwatchError {
    TickwatchError::ConfigMissing {
        section: section.to_string(),
        key: key.to_string(),
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> TickwatchError {
    TickwatchError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn required(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, TickwatchError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(missing(section, key)),
    }
}

pub fn load_monitor_config(config: &dyn ConfigPort) -> Result<MonitorConfig, TickwatchError> {
    let mut monitor = MonitorConfig::new(load_data_source(config)?);
    monitor.update = load_update_period(config);
    monitor.verbose = config.get_bool(MONITOR, "verbose", false);

    let pairs = config.get_list(MONITOR, "pairs");
    if pairs.is_empty() {
        return Err(missing(MONITOR, "pairs"));
    }
    for id in &pairs {
        if id == GLOBAL_ENTITY {
            return Err(invalid(
                MONITOR,
                "pairs",
                format!("'{}' is reserved for cross-pair watchers", GLOBAL_ENTITY),
            ));
        }
        if !is_identifier(id) {
            return Err(invalid(
                MONITOR,
                "pairs",
                format!("pair id '{}' is not a valid identifier", id),
            ));
        }
        monitor.entities.push(load_entity(config, id)?);
    }

    for name in config.get_list(MONITOR, "watchers") {
        monitor
            .global_rules
            .push(load_rule(config, GLOBAL_ENTITY, &name)?);
    }

    let notifiers = config.get_list(MONITOR, "notifiers");
    if !notifiers.is_empty() {
        monitor.notifiers = notifiers
            .iter()
            .map(|name| load_notifier(config, name))
            .collect::<Result<_, _>>()?;
    }

    validate_rules(&monitor)?;

    tracing::debug!(
        entities = monitor.entities.len(),
        rules = monitor.rule_count(),
        notifiers = monitor.notifiers.len(),
        "monitor config loaded"
    );
    Ok(monitor)
}

fn load_update_period(config: &dyn ConfigPort) -> std::time::Duration {
    let Some(raw) = config.get_string(MONITOR, "update") else {
        tracing::warn!("no update period configured, using {:?}", DEFAULT_UPDATE);
        return DEFAULT_UPDATE;
    };
    match parse_period(&raw) {
        Ok(period) => period,
        Err(reason) => {
            tracing::warn!(%reason, "invalid update period, using {:?}", DEFAULT_UPDATE);
            DEFAULT_UPDATE
        }
    }
}

fn load_data_source(config: &dyn ConfigPort) -> Result<DataSource, TickwatchError> {
    let source = config
        .get_string(DATA, "source")
        .unwrap_or_else(|| "cryptocompare".to_string());
    match source.trim().to_ascii_lowercase().as_str() {
        "cryptocompare" => Ok(DataSource::CryptoCompare {
            api_key: config
                .get_string(DATA, "api_key")
                .filter(|k| !k.trim().is_empty()),
        }),
        "csv" => Ok(DataSource::Csv {
            path: PathBuf::from(required(config, DATA, "path")?),
        }),
        other => Err(invalid(
            DATA,
            "source",
            format!("unknown data source '{}'", other),
        )),
    }
}

fn load_entity(config: &dyn ConfigPort, id: &str) -> Result<Entity, TickwatchError> {
    let section = format!("pair.{}", id);
    let mut entity = Entity::new(
        id,
        &required(config, &section, "coin")?,
        &required(config, &section, "currency")?,
    );

    entity.name = config
        .get_string(&section, "name")
        .map(|n| n.trim().to_string())
        .unwrap_or_default();
    entity.exchange = config
        .get_string(&section, "exchange")
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| DEFAULT_EXCHANGE.to_string());

    if let Some(raw) = config.get_string(&section, "interval") {
        entity.interval = raw
            .parse::<Interval>()
            .map_err(|reason| invalid(&section, "interval", reason))?;
    }

    let length = config.get_int(&section, "length", DEFAULT_LENGTH as i64);
    if length <= 0 {
        return Err(invalid(&section, "length", "length must be positive"));
    }
    entity.length = length as usize;

    entity.update = config.get_list(&section, "update");

    if let Some(raw) = config.get_string(&section, "indicators") {
        entity.indicators =
            parse_indicators(&raw).map_err(|reason| invalid(&section, "indicators", reason))?;
    }

    for name in config.get_list(&section, "watchers") {
        entity.rules.push(load_rule(config, id, &name)?);
    }
    Ok(entity)
}

/// Parses `name:kind(p1,p2); name:kind; kind(p1)`. A bare kind names the
/// indicator after itself.
pub fn parse_indicators(raw: &str) -> Result<Vec<IndicatorSpec>, String> {
    raw.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse_indicator)
        .collect()
}

fn parse_indicator(item: &str) -> Result<IndicatorSpec, String> {
    let (name, rest) = match item.split_once(':') {
        Some((name, rest)) => (name.trim(), rest.trim()),
        None => ("", item),
    };

    let (kind, params) = match rest.split_once('(') {
        Some((kind, args)) => {
            let args = args
                .trim()
                .strip_suffix(')')
                .ok_or_else(|| format!("missing ')' in '{}'", item))?;
            let params = args
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(|a| {
                    a.parse::<usize>()
                        .map_err(|_| format!("invalid parameter '{}' in '{}'", a, item))
                })
                .collect::<Result<Vec<_>, _>>()?;
            (kind.trim(), params)
        }
        None => (rest.trim(), Vec::new()),
    };

    if kind.is_empty() {
        return Err(format!("missing indicator kind in '{}'", item));
    }
    let name = if name.is_empty() { kind } else { name };
    if !is_identifier(name) {
        return Err(format!("indicator name '{}' is not a valid identifier", name));
    }
    Ok(IndicatorSpec::new(name, kind, &params))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn load_rule(config: &dyn ConfigPort, owner: &str, name: &str) -> Result<Rule, TickwatchError> {
    let section = format!("watcher.{}.{}", owner, name);
    let expr = config.get_string(&section, "expr");
    let script = config.get_string(&section, "script");

    let code = match (expr, script) {
        (Some(e), None) if !e.trim().is_empty() => RuleCode::Expression(e.trim().to_string()),
        (None, Some(s)) if !s.trim().is_empty() => RuleCode::Script(s.trim().to_string()),
        (Some(_), Some(_)) => {
            return Err(invalid(
                &section,
                "expr",
                "set either expr or script, not both",
            ));
        }
        _ => return Err(missing(&section, "expr")),
    };

    Ok(Rule {
        name: name.to_string(),
        code,
        values: config.get_list(&section, "values"),
    })
}

fn load_notifier(config: &dyn ConfigPort, name: &str) -> Result<NotifierConfig, TickwatchError> {
    let section = format!("notifier.{}", name);
    let kind = match required(config, &section, "type")?.to_ascii_lowercase().as_str() {
        "console" => NotifierKind::Console,
        "telegram" => NotifierKind::Telegram {
            recipient: required(config, &section, "recipient")?,
            sender: required(config, &section, "sender")?,
            auth: required(config, &section, "auth")?,
        },
        other => {
            return Err(invalid(
                &section,
                "type",
                format!("unknown notifier type '{}'", other),
            ));
        }
    };

    let format = match config.get_string(&section, "format") {
        Some(raw) => raw
            .parse::<MessageFormat>()
            .map_err(|reason| invalid(&section, "format", reason))?,
        None => MessageFormat::default(),
    };

    Ok(NotifierConfig {
        name: name.to_string(),
        kind,
        format,
    })
}

/// Parses every expression and compiles every script.
pub fn validate_rules(monitor: &MonitorConfig) -> Result<(), TickwatchError> {
    let evaluator = RuleEvaluator::new();
    let owned = monitor
        .entities
        .iter()
        .flat_map(|e| e.rules.iter().map(move |r| (e.id.as_str(), r)));
    let global = monitor.global_rules.iter().map(|r| (GLOBAL_ENTITY, r));

    for (owner, rule) in owned.chain(global) {
        evaluator.check(rule).map_err(|err| {
            let section = format!("watcher.{}.{}", owner, rule.name);
            let key = rule.code.language();
            match err {
                TickwatchError::ExprParse(parse) => {
                    invalid(&section, key, parse.display_with_context(rule.code.text()))
                }
                other => invalid(&section, key, other.to_string()),
            }
        })?;
    }
    Ok(())
}
