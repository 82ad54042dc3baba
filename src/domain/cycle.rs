//! One evaluation cycle over all configured entities.
//!
//! Per entity: fetch ticks, build chronological OHLCV, populate the local and
//! global contexts (identity scalars, OHLCV, indicator outputs in declaration
//! order), send the optional update report, then evaluate the entity's rules
//! against its local context. Global rules run last against the global
//! context. Contexts and result sets are rebuilt every cycle; only the
//! debounce cache outlives it.

use std::collections::BTreeMap;

use crate::domain::context::{prefixed, Context, EntityWriter};
use crate::domain::debounce::{DebounceCache, GLOBAL_ENTITY};
use crate::domain::error::TickwatchError;
use crate::domain::evaluator::RuleEvaluator;
use crate::domain::indicator::compute;
use crate::domain::monitor::{Entity, MonitorConfig};
use crate::domain::notification::Notification;
use crate::domain::ohlcv::Ohlcv;
use crate::domain::series::Series;
use crate::ports::data_port::MarketDataPort;
use crate::ports::notify_port::NotifyPort;

/// Named chronological series produced during a cycle.
pub type Dataset = BTreeMap<String, Series>;

#[derive(Debug, Default)]
pub struct CycleReport {
    pub entities: usize,
    pub rules_evaluated: usize,
    pub notifications: usize,
    /// Every series of the cycle, keyed `<entity>_<name>`.
    pub results: Dataset,
}

pub struct CycleDriver<'a> {
    data: &'a dyn MarketDataPort,
    notifier: &'a dyn NotifyPort,
    evaluator: RuleEvaluator,
}

impl<'a> CycleDriver<'a> {
    pub fn new(data: &'a dyn MarketDataPort, notifier: &'a dyn NotifyPort) -> Self {
        Self {
            data,
            notifier,
            evaluator: RuleEvaluator::new(),
        }
    }

    pub fn run(
        &self,
        config: &MonitorConfig,
        cache: &mut DebounceCache,
    ) -> Result<CycleReport, TickwatchError> {
        let mut report = CycleReport::default();
        let mut global = Context::global();

        for entity in &config.entities {
            let _span = tracing::debug_span!("entity", id = %entity.id).entered();
            self.run_entity(entity, config.verbose, &mut global, cache, &mut report)?;
            report.entities += 1;
        }

        for rule in &config.global_rules {
            let (fired, mut notification) = self.evaluator.evaluate(&global, rule)?;
            report.rules_evaluated += 1;
            if cache.should_notify(GLOBAL_ENTITY, &rule.name, fired) {
                notification.values = collect_values(&rule.values, &report.results);
                self.emit(&notification, &mut report);
            }
        }

        tracing::debug!(
            entities = report.entities,
            rules = report.rules_evaluated,
            notifications = report.notifications,
            "cycle complete"
        );
        Ok(report)
    }

    fn run_entity(
        &self,
        entity: &Entity,
        verbose: bool,
        global: &mut Context,
        cache: &mut DebounceCache,
        report: &mut CycleReport,
    ) -> Result<(), TickwatchError> {
        let ticks = self.data.fetch_ticks(
            &entity.coin,
            &entity.currency,
            entity.interval,
            entity.length,
            &entity.exchange,
        )?;
        if ticks.is_empty() {
            return Err(TickwatchError::EmptySeries {
                name: prefixed(&entity.id, "close"),
            });
        }
        let ohlcv = Ohlcv::from_ticks(&ticks);

        let mut local = Context::local(&entity.id);
        let mut results = Dataset::new();
        {
            let mut writer = EntityWriter::new(&entity.id, &mut local, global);
            writer.set_scalar("coin", entity.coin.as_str());
            writer.set_scalar("currency", entity.currency.as_str());
            writer.set_scalar("exchange", entity.exchange.as_str());
            writer.set_scalar("interval", entity.interval.to_string());
            writer.set_scalar("length", entity.length as i64);

            for (name, series) in ohlcv.named() {
                writer.set_series(name, series)?;
                results.insert(name.to_string(), series.clone());
            }

            for spec in &entity.indicators {
                for output in compute(&ohlcv, spec) {
                    let name = format!("{}{}", spec.name, output.suffix);
                    writer.set_series(&name, &output.series)?;
                    results.insert(name, output.series);
                }
            }
        }
        log_results(&entity.id, &results, verbose);

        if !entity.update.is_empty() {
            let values = collect_values(&entity.update, &results);
            self.emit(&Notification::update(&entity.source(), values), report);
        }

        for rule in &entity.rules {
            let (fired, mut notification) = self.evaluator.evaluate(&local, rule)?;
            report.rules_evaluated += 1;
            if cache.should_notify(&entity.id, &rule.name, fired) {
                notification.source = entity.label().to_string();
                notification.values = collect_values(&rule.values, &results);
                self.emit(&notification, report);
            }
        }

        report.results.extend(
            results
                .into_iter()
                .map(|(name, series)| (prefixed(&entity.id, &name), series)),
        );
        Ok(())
    }

    fn emit(&self, notification: &Notification, report: &mut CycleReport) {
        tracing::info!(
            source = %notification.source,
            message = %notification.message,
            "notification"
        );
        report.notifications += 1;
        if let Err(err) = self.notifier.send(notification) {
            tracing::warn!(notifier = self.notifier.name(), error = %err, "delivery failed");
        }
    }
}

/// Latest value of each named result. Unknown names are skipped.
fn collect_values(names: &[String], results: &Dataset) -> BTreeMap<String, f64> {
    let mut values = BTreeMap::new();
    for name in names {
        match results.get(name).and_then(|series| series.last()) {
            Some(value) => {
                values.insert(name.clone(), *value);
            }
            None => tracing::warn!(value = %name, "unknown result name, skipped"),
        }
    }
    values
}

fn log_results(entity: &str, results: &Dataset, verbose: bool) {
    for (name, series) in results {
        let latest = series.last().copied().unwrap_or(f64::NAN);
        if verbose {
            tracing::info!(entity, name = %name, latest, "result");
        } else {
            tracing::debug!(entity, name = %name, latest, "result");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_values_skips_unknown() {
        let mut results = Dataset::new();
        results.insert("close".into(), vec![1.0, 2.0]);
        results.insert("empty".into(), vec![]);
        let names = vec!["close".to_string(), "rsi".to_string(), "empty".to_string()];
        let values = collect_values(&names, &results);
        assert_eq!(values.len(), 1);
        assert_eq!(values["close"], 2.0);
    }
}
