//! Rule evaluation in both rule languages.
//!
//! Expressions are parsed and evaluated against the expression namespace of
//! a `Context`; they fire iff the result is `true`. Scripts run in a fresh
//! rhai scope built from the script namespace and fire iff they called
//! `alert(true)` at least once.

use std::cell::Cell;
use std::rc::Rc;

use rhai::Engine;

use crate::domain::context::Context;
use crate::domain::error::TickwatchError;
use crate::domain::expr::Value;
use crate::domain::expr_eval;
use crate::domain::expr_parser;
use crate::domain::notification::Notification;
use crate::domain::rule::{Rule, RuleCode};

/// Upper bound on rhai operations per script run.
pub const MAX_OPERATIONS: u64 = 100_000;

/// Result cell written by the script `alert` hook.
#[derive(Debug, Clone, Default)]
pub struct AlertSignal(Rc<Cell<bool>>);

impl AlertSignal {
    pub fn reset(&self) {
        self.0.set(false);
    }

    /// Latches: once raised within a run, later `false` calls don't clear it.
    pub fn raise(&self, fired: bool) {
        self.0.set(self.0.get() || fired);
    }

    pub fn fired(&self) -> bool {
        self.0.get()
    }
}

pub struct RuleEvaluator {
    engine: Engine,
    signal: AlertSignal,
}

impl RuleEvaluator {
    pub fn new() -> Self {
        let signal = AlertSignal::default();
        let mut engine = Engine::new();
        engine.set_max_operations(MAX_OPERATIONS);

        let hook = signal.clone();
        engine.register_fn("alert", move |fired: bool| hook.raise(fired));

        Self { engine, signal }
    }

    /// Evaluates `rule` against `ctx`. The notification is built whether or
    /// not the rule fired.
    pub fn evaluate(
        &self,
        ctx: &Context,
        rule: &Rule,
    ) -> Result<(bool, Notification), TickwatchError> {
        let fired = match &rule.code {
            RuleCode::Expression(text) => self.evaluate_expression(ctx, rule, text)?,
            RuleCode::Script(text) => self.run_script(ctx, rule, text)?,
        };
        tracing::debug!(rule = %rule.name, scope = %ctx.scope(), fired, "rule evaluated");
        Ok((fired, Notification::new(rule)))
    }

    fn evaluate_expression(
        &self,
        ctx: &Context,
        rule: &Rule,
        text: &str,
    ) -> Result<bool, TickwatchError> {
        let expr = expr_parser::parse(text)?;
        match expr_eval::evaluate(&expr, ctx.expr_vars())? {
            Value::Bool(fired) => Ok(fired),
            other => Err(TickwatchError::RuleResult {
                rule: rule.name.clone(),
                found: other.type_name().to_string(),
            }),
        }
    }

    fn run_script(&self, ctx: &Context, rule: &Rule, text: &str) -> Result<bool, TickwatchError> {
        self.signal.reset();
        let mut scope = ctx.script_scope();
        self.engine
            .run_with_scope(&mut scope, text)
            .map_err(|e| TickwatchError::Script {
                rule: rule.name.clone(),
                reason: e.to_string(),
            })?;
        Ok(self.signal.fired())
    }

    /// Parses or compiles the rule without running it.
    pub fn check(&self, rule: &Rule) -> Result<(), TickwatchError> {
        match &rule.code {
            RuleCode::Expression(text) => {
                expr_parser::parse(text)?;
            }
            RuleCode::Script(text) => {
                self.engine
                    .compile(text)
                    .map_err(|e| TickwatchError::Script {
                        rule: rule.name.clone(),
                        reason: e.to_string(),
                    })?;
            }
        }
        Ok(())
    }
}

impl Default for RuleEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::EntityWriter;

    fn btc_context(closes: &[f64]) -> Context {
        let mut local = Context::local("btc");
        let mut global = Context::global();
        let mut writer = EntityWriter::new("btc", &mut local, &mut global);
        writer.set_scalar("coin", "BTC");
        writer.set_scalar("length", closes.len() as i64);
        writer.set_series("close", closes).unwrap();
        local
    }

    #[test]
    fn alert_signal_latches() {
        let signal = AlertSignal::default();
        signal.raise(true);
        signal.raise(false);
        assert!(signal.fired());
        signal.reset();
        assert!(!signal.fired());
    }

    #[test]
    fn expression_fires_on_true() {
        let evaluator = RuleEvaluator::new();
        let ctx = btc_context(&[100.0, 105.0, 95.0]);
        let (fired, n) = evaluator
            .evaluate(&ctx, &Rule::expression("dip", "close < 100"))
            .unwrap();
        assert!(fired);
        assert_eq!(n.message, "dip");
        assert_eq!(n.code, "close < 100");
    }

    #[test]
    fn expression_false_does_not_fire() {
        let evaluator = RuleEvaluator::new();
        let ctx = btc_context(&[100.0, 105.0]);
        let (fired, n) = evaluator
            .evaluate(&ctx, &Rule::expression("dip", "close < 100"))
            .unwrap();
        assert!(!fired);
        assert_eq!(n.message, "dip");
    }

    #[test]
    fn non_bool_expression_is_an_error() {
        let evaluator = RuleEvaluator::new();
        let ctx = btc_context(&[100.0]);
        let err = evaluator
            .evaluate(&ctx, &Rule::expression("price", "close * 2"))
            .unwrap_err();
        assert!(matches!(err, TickwatchError::RuleResult { ref found, .. } if found == "number"));
    }

    #[test]
    fn expression_parse_error_propagates() {
        let evaluator = RuleEvaluator::new();
        let ctx = btc_context(&[100.0]);
        let err = evaluator
            .evaluate(&ctx, &Rule::expression("bad", "close <"))
            .unwrap_err();
        assert!(matches!(err, TickwatchError::ExprParse(_)));
    }

    #[test]
    fn script_fires_through_alert() {
        let evaluator = RuleEvaluator::new();
        let ctx = btc_context(&[100.0, 105.0, 95.0]);
        let rule = Rule::script("falling", "alert(close[close.len() - 1] < close[0]);");
        let (fired, n) = evaluator.evaluate(&ctx, &rule).unwrap();
        assert!(fired);
        assert_eq!(n.code, rule.code.text());
    }

    #[test]
    fn script_without_alert_does_not_fire() {
        let evaluator = RuleEvaluator::new();
        let ctx = btc_context(&[100.0]);
        let (fired, _) = evaluator
            .evaluate(&ctx, &Rule::script("quiet", "let x = coin;"))
            .unwrap();
        assert!(!fired);
    }

    #[test]
    fn signal_is_reset_between_runs() {
        let evaluator = RuleEvaluator::new();
        let ctx = btc_context(&[100.0]);
        let firing = Rule::script("on", "alert(true);");
        let quiet = Rule::script("off", "alert(false);");
        assert!(evaluator.evaluate(&ctx, &firing).unwrap().0);
        assert!(!evaluator.evaluate(&ctx, &quiet).unwrap().0);
    }

    #[test]
    fn script_sees_identity_scalars() {
        let evaluator = RuleEvaluator::new();
        let ctx = btc_context(&[1.0, 2.0, 3.0]);
        let rule = Rule::script("id", "alert(coin == \"BTC\" && length == 3);");
        assert!(evaluator.evaluate(&ctx, &rule).unwrap().0);
    }

    #[test]
    fn alert_with_non_bool_is_an_error() {
        let evaluator = RuleEvaluator::new();
        let ctx = btc_context(&[100.0]);
        let err = evaluator
            .evaluate(&ctx, &Rule::script("bad", "alert(1);"))
            .unwrap_err();
        assert!(matches!(err, TickwatchError::Script { ref rule, .. } if rule == "bad"));
    }

    #[test]
    fn runaway_script_hits_operation_limit() {
        let evaluator = RuleEvaluator::new();
        let ctx = btc_context(&[100.0]);
        let err = evaluator
            .evaluate(&ctx, &Rule::script("spin", "loop { }"))
            .unwrap_err();
        assert!(matches!(err, TickwatchError::Script { .. }));
    }

    #[test]
    fn scripts_cannot_modify_context() {
        let evaluator = RuleEvaluator::new();
        let ctx = btc_context(&[100.0]);
        let err = evaluator
            .evaluate(&ctx, &Rule::script("assign", "coin = \"ETH\";"))
            .unwrap_err();
        assert!(matches!(err, TickwatchError::Script { .. }));
        assert_eq!(ctx.get("coin"), Some(&Value::Text("BTC".into())));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let evaluator = RuleEvaluator::new();
        let ctx = btc_context(&[100.0, 95.0]);
        for rule in [
            Rule::expression("dip", "close < 100"),
            Rule::script("dip", "alert(close[close.len() - 1] < 100.0);"),
        ] {
            let first = evaluator.evaluate(&ctx, &rule).unwrap().0;
            let second = evaluator.evaluate(&ctx, &rule).unwrap().0;
            assert_eq!(first, second);
        }
    }

    #[test]
    fn check_reports_syntax_errors() {
        let evaluator = RuleEvaluator::new();
        assert!(evaluator.check(&Rule::expression("ok", "close < 100")).is_ok());
        assert!(evaluator.check(&Rule::expression("bad", "close <")).is_err());
        assert!(evaluator.check(&Rule::script("ok", "alert(true);")).is_ok());
        assert!(evaluator.check(&Rule::script("bad", "alert(")).is_err());
    }
}
