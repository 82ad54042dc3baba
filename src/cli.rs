//! CLI definition, adapter wiring and the monitor loop.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Instant;

use crate::adapters::console_notifier::ConsoleNotifier;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::dispatcher::{BoxedNotifier, Dispatcher};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config::load_monitor_config;
use crate::domain::cycle::CycleDriver;
use crate::domain::debounce::DebounceCache;
use crate::domain::error::TickwatchError;
use crate::domain::indicator::{IndicatorKind, IndicatorSpec, SUPPORTED_KINDS};
use crate::domain::monitor::{DataSource, MonitorConfig, NotifierConfig, NotifierKind};
use crate::ports::data_port::MarketDataPort;
use crate::ports::notify_port::NotifyPort;

#[derive(Parser, Debug)]
#[command(name = "tickwatch", about = "Market watcher with edge-triggered alerts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the monitor loop
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },
    /// Validate a monitor configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List supported indicator kinds and their outputs
    Indicators,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run { config, once } => run_monitor(&config, once),
        Command::Validate { config } => run_validate(&config),
        Command::Indicators => run_indicators(),
    }
}

fn report(err: TickwatchError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

pub fn load_config(path: &Path) -> Result<MonitorConfig, ExitCode> {
    let adapter = FileConfigAdapter::from_file(path).map_err(report)?;
    load_monitor_config(&adapter).map_err(report)
}

pub fn build_data_port(source: &DataSource) -> Result<Box<dyn MarketDataPort>, TickwatchError> {
    match source {
        DataSource::Csv { path } => Ok(Box::new(CsvAdapter::new(path.clone()))),
        #[cfg(feature = "http")]
        DataSource::CryptoCompare { api_key } => {
            use crate::adapters::cryptocompare_adapter::CryptoCompareAdapter;
            Ok(Box::new(CryptoCompareAdapter::new(api_key.clone())?))
        }
        #[cfg(not(feature = "http"))]
        DataSource::CryptoCompare { .. } => Err(TickwatchError::ConfigInvalid {
            section: "data".to_string(),
            key: "source".to_string(),
            reason: "http feature is required for cryptocompare".to_string(),
        }),
    }
}

pub fn build_notifiers(configs: &[NotifierConfig]) -> Result<Vec<BoxedNotifier>, TickwatchError> {
    let mut notifiers: Vec<BoxedNotifier> = Vec::with_capacity(configs.len());
    for config in configs {
        match &config.kind {
            NotifierKind::Console => notifiers.push(Box::new(ConsoleNotifier::new(config.format))),
            #[cfg(feature = "http")]
            NotifierKind::Telegram {
                recipient,
                sender,
                auth,
            } => {
                use crate::adapters::telegram_notifier::TelegramNotifier;
                notifiers.push(Box::new(TelegramNotifier::new(
                    recipient,
                    sender,
                    auth,
                    config.format,
                )?));
            }
            #[cfg(not(feature = "http"))]
            NotifierKind::Telegram { .. } => {
                return Err(TickwatchError::ConfigInvalid {
                    section: format!("notifier.{}", config.name),
                    key: "type".to_string(),
                    reason: "http feature is required for telegram".to_string(),
                });
            }
        }
    }
    Ok(notifiers)
}

/// Runs cycles back to back at the configured period until a cycle fails
/// or `max_cycles` have run. A cycle that overruns the period is followed
/// immediately by the next one; cycles never overlap.
pub fn monitor_loop(
    config: &MonitorConfig,
    data: &dyn MarketDataPort,
    notifier: &dyn NotifyPort,
    cache: &mut DebounceCache,
    max_cycles: Option<usize>,
) -> Result<usize, TickwatchError> {
    let driver = CycleDriver::new(data, notifier);
    let mut cycles = 0;
    loop {
        let started = Instant::now();
        let report = driver.run(config, cache)?;
        cycles += 1;
        tracing::info!(
            cycle = cycles,
            entities = report.entities,
            rules = report.rules_evaluated,
            notifications = report.notifications,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cycle finished"
        );

        if max_cycles.is_some_and(|max| cycles >= max) {
            return Ok(cycles);
        }

        match config.update.checked_sub(started.elapsed()) {
            Some(rest) => thread::sleep(rest),
            None => tracing::warn!(
                period = ?config.update,
                "cycle overran the update period, starting the next one now"
            ),
        }
    }
}

fn run_monitor(config_path: &Path, once: bool) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let data = match build_data_port(&config.data) {
        Ok(d) => d,
        Err(e) => return report(e),
    };
    let dispatcher = match build_notifiers(&config.notifiers).and_then(Dispatcher::spawn) {
        Ok(d) => d,
        Err(e) => return report(e),
    };

    tracing::info!(
        entities = config.entities.len(),
        rules = config.rule_count(),
        period = ?config.update,
        "monitor started"
    );

    let mut cache = DebounceCache::new();
    let max_cycles = once.then_some(1);
    match monitor_loop(&config, data.as_ref(), &dispatcher, &mut cache, max_cycles) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "cycle failed, stopping");
            (&e).into()
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating monitor config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    for entity in &config.entities {
        eprintln!(
            "\n[{}] {}/{} on {} every {} ({} samples)",
            entity.id,
            entity.coin,
            entity.currency,
            entity.exchange,
            entity.interval,
            entity.length
        );
        for spec in &entity.indicators {
            match IndicatorKind::from_spec(spec) {
                Some(kind) => eprintln!("  indicator {} = {}", spec.name, kind),
                None => eprintln!(
                    "  indicator {} = {} (unknown kind, produces no values)",
                    spec.name, spec.kind
                ),
            }
        }
        for rule in &entity.rules {
            eprintln!("  watcher   {}: {}", rule, rule.code.text());
        }
    }
    if !config.global_rules.is_empty() {
        eprintln!("\n[global]");
        for rule in &config.global_rules {
            eprintln!("  watcher   {}: {}", rule, rule.code.text());
        }
    }

    eprintln!(
        "\nConfiguration is valid: {} pairs, {} watchers, {} notifiers, update every {:?}.",
        config.entities.len(),
        config.rule_count(),
        config.notifiers.len(),
        config.update
    );
    ExitCode::SUCCESS
}

fn run_indicators() -> ExitCode {
    for kind in SUPPORTED_KINDS {
        let spec = IndicatorSpec::new(kind, kind, &[]);
        if let Some(resolved) = IndicatorKind::from_spec(&spec) {
            let outputs: Vec<String> = resolved
                .suffixes()
                .iter()
                .map(|suffix| format!("<name>{}", suffix))
                .collect();
            println!("{:<10} {:<24} {}", kind, resolved.to_string(), outputs.join(", "));
        }
    }
    ExitCode::SUCCESS
}
