//! Notifications and their text rendering.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::rule::Rule;

pub const UPDATE_MESSAGE: &str = "Update";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFormat {
    Short,
    #[default]
    Normal,
    Long,
}

impl FromStr for MessageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(MessageFormat::Short),
            "normal" => Ok(MessageFormat::Normal),
            "long" => Ok(MessageFormat::Long),
            other => Err(format!(
                "unknown format '{}' (expected short, normal or long)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub source: String,
    pub code: String,
    pub values: BTreeMap<String, f64>,
}

impl Notification {
    /// A notification for `rule`, stamped now, without source or values.
    pub fn new(rule: &Rule) -> Self {
        Self {
            timestamp: Utc::now(),
            message: rule.name.clone(),
            source: String::new(),
            code: rule.code.text().to_string(),
            values: BTreeMap::new(),
        }
    }

    /// The unconditional per-cycle value report.
    pub fn update(source: &str, values: BTreeMap<String, f64>) -> Self {
        Self {
            timestamp: Utc::now(),
            message: UPDATE_MESSAGE.to_string(),
            source: source.to_string(),
            code: String::new(),
            values,
        }
    }

    pub fn format(&self, format: MessageFormat) -> String {
        let mut out = String::new();
        if !self.source.is_empty() {
            out.push_str(&self.source);
            out.push('\n');
        }
        out.push_str(&self.message);
        out.push('\n');

        if format == MessageFormat::Short {
            return out;
        }

        if !self.values.is_empty() {
            out.push('\n');
            for (name, value) in &self.values {
                let _ = writeln!(out, "{:<12}: {}", title_case(name), format_value(*value));
            }
        }

        if format == MessageFormat::Long {
            out.push('\n');
            out.push_str(&self.code);
        }
        out
    }
}

/// Six decimals below 1, two below 1000, none above.
fn format_value(value: f64) -> String {
    let rendered = if value < 1.0 {
        format!("{:.6}", value)
    } else if value < 1000.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.0}", value)
    };
    format!("{:<8}", rendered)
}

fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Notification {
        let rule = Rule::expression("oversold", "rsi < 30");
        let mut n = Notification::new(&rule);
        n.source = "Bitcoin 1H".into();
        n.values.insert("rsi".into(), 28.25);
        n.values.insert("close".into(), 43250.7);
        n.values.insert("macd_Hist".into(), -0.5);
        n
    }

    #[test]
    fn new_copies_rule_name_and_code() {
        let rule = Rule::script("spike", "alert(close > 1.0)");
        let n = Notification::new(&rule);
        assert_eq!(n.message, "spike");
        assert_eq!(n.code, "alert(close > 1.0)");
        assert!(n.source.is_empty());
        assert!(n.values.is_empty());
    }

    #[test]
    fn short_format_has_source_and_message_only() {
        assert_eq!(sample().format(MessageFormat::Short), "Bitcoin 1H\noversold\n");
    }

    #[test]
    fn normal_format_lists_sorted_values() {
        let text = sample().format(MessageFormat::Normal);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Bitcoin 1H");
        assert_eq!(lines[1], "oversold");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Close       : 43251   ");
        assert_eq!(lines[4], "Macd_Hist   : -0.500000");
        assert_eq!(lines[5], "Rsi         : 28.25   ");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn long_format_appends_code() {
        let text = sample().format(MessageFormat::Long);
        assert!(text.ends_with("\nrsi < 30"));
    }

    #[test]
    fn normal_without_values_omits_blank_line() {
        let rule = Rule::expression("dip", "close < 100");
        let n = Notification::new(&rule);
        assert_eq!(n.format(MessageFormat::Normal), "dip\n");
    }

    #[test]
    fn update_notification() {
        let mut values = BTreeMap::new();
        values.insert("close".into(), 0.5);
        let n = Notification::update("Ether 4H", values);
        assert_eq!(n.message, UPDATE_MESSAGE);
        assert_eq!(n.format(MessageFormat::Normal), "Ether 4H\nUpdate\n\nClose       : 0.500000\n");
    }

    #[test]
    fn parse_formats() {
        assert_eq!("short".parse::<MessageFormat>().unwrap(), MessageFormat::Short);
        assert_eq!("LONG".parse::<MessageFormat>().unwrap(), MessageFormat::Long);
        assert!("verbose".parse::<MessageFormat>().is_err());
        assert_eq!(MessageFormat::default(), MessageFormat::Normal);
    }
}
