//! Domain error types.

/// A parse error with position information for expression parsing.
#[derive(Debug, Clone, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for tickwatch.
#[derive(Debug, thiserror::Error)]
pub enum TickwatchError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to fetch {symbol}/{currency} on {exchange}: {reason}")]
    Fetch {
        symbol: String,
        currency: String,
        exchange: String,
        reason: String,
    },

    #[error("series '{name}' is empty")]
    EmptySeries { name: String },

    #[error(transparent)]
    ExprParse(#[from] ParseError),

    #[error("expression error: {reason}")]
    ExprEval { reason: String },

    #[error("rule '{rule}' must evaluate to a boolean, got {found}")]
    RuleResult { rule: String, found: String },

    #[error("script error in rule '{rule}': {reason}")]
    Script { rule: String, reason: String },

    #[error("notification delivery failed via {notifier}: {reason}")]
    Delivery { notifier: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TickwatchError> for std::process::ExitCode {
    fn from(err: &TickwatchError) -> Self {
        let code: u8 = match err {
            TickwatchError::Io(_) | TickwatchError::Delivery { .. } => 1,
            TickwatchError::ConfigParse { .. }
            | TickwatchError::ConfigMissing { .. }
            | TickwatchError::ConfigInvalid { .. } => 2,
            TickwatchError::Fetch { .. } | TickwatchError::EmptySeries { .. } => 3,
            TickwatchError::ExprParse(_)
            | TickwatchError::ExprEval { .. }
            | TickwatchError::RuleResult { .. }
            | TickwatchError::Script { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_caret_points_at_position() {
        let err = ParseError {
            message: "unexpected ')'".into(),
            position: 6,
        };
        let rendered = err.display_with_context("close )");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "close )");
        assert_eq!(lines[1], "      ^");
        assert!(lines[2].contains("position 6"));
    }

    #[test]
    fn empty_series_message_names_series() {
        let err = TickwatchError::EmptySeries {
            name: "close".into(),
        };
        assert_eq!(err.to_string(), "series 'close' is empty");
    }

    #[test]
    fn parse_error_converts_transparently() {
        let err: TickwatchError = ParseError {
            message: "expected expression".into(),
            position: 0,
        }
        .into();
        assert!(matches!(err, TickwatchError::ExprParse(_)));
        assert!(err.to_string().starts_with("parse error at position 0"));
    }
}
