//! User-declared watch rules.
//!
//! A rule is either a boolean expression or a script that reports through
//! `alert(bool)`. `values` lists result names to attach to a notification.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleCode {
    Expression(String),
    Script(String),
}

impl RuleCode {
    pub fn text(&self) -> &str {
        match self {
            RuleCode::Expression(text) | RuleCode::Script(text) => text,
        }
    }

    pub fn language(&self) -> &'static str {
        match self {
            RuleCode::Expression(_) => "expr",
            RuleCode::Script(_) => "script",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub code: RuleCode,
    pub values: Vec<String>,
}

impl Rule {
    pub fn expression(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            code: RuleCode::Expression(text.to_string()),
            values: Vec::new(),
        }
    }

    pub fn script(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            code: RuleCode::Script(text.to_string()),
            values: Vec::new(),
        }
    }

    pub fn with_values(mut self, values: &[&str]) -> Self {
        self.values = values.iter().map(|v| v.to_string()).collect();
        self
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code.language())
    }
}
