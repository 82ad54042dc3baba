//! Expression evaluation.
//!
//! Walks an `Expr` against a flat name -> `Value` namespace.
//!
//! # Evaluation Semantics
//!
//! - `&&` / `||`: short-circuit; both operands must be booleans
//! - Arithmetic on two integers stays integer (`/` and `**` always yield a
//!   float); mixed operands widen to float
//! - `+` on two strings concatenates
//! - `==` / `!=` between different types: not equal, never an error
//! - Ordering comparisons need two numbers or two strings; NaN compares false
//! - `series[i]`: chronological index, negative counts back from the latest

use std::collections::HashMap;

use crate::domain::error::TickwatchError;
use crate::domain::expr::{BinaryOp, Expr, UnaryOp, Value};

fn eval_error(reason: impl Into<String>) -> TickwatchError {
    TickwatchError::ExprEval {
        reason: reason.into(),
    }
}

pub fn evaluate(expr: &Expr, vars: &HashMap<String, Value>) -> Result<Value, TickwatchError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Variable { name, position } => vars.get(name).cloned().ok_or_else(|| {
            eval_error(format!("unknown variable '{}' at position {}", name, position))
        }),
        Expr::Index { target, index } => {
            let target = evaluate(target, vars)?;
            let index = evaluate(index, vars)?;
            resolve_index(&target, &index)
        }
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, vars)?;
            apply_unary(*op, value)
        }
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => {
            if !expect_bool(evaluate(left, vars)?, "&&")? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(expect_bool(evaluate(right, vars)?, "&&")?))
        }
        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => {
            if expect_bool(evaluate(left, vars)?, "||")? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(expect_bool(evaluate(right, vars)?, "||")?))
        }
        Expr::Binary { op, left, right } => {
            let left = evaluate(left, vars)?;
            let right = evaluate(right, vars)?;
            apply_binary(*op, left, right)
        }
        Expr::Ternary {
            condition,
            then,
            otherwise,
        } => {
            if expect_bool(evaluate(condition, vars)?, "?:")? {
                evaluate(then, vars)
            } else {
                evaluate(otherwise, vars)
            }
        }
    }
}

fn expect_bool(value: Value, op: &str) -> Result<bool, TickwatchError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(eval_error(format!(
            "'{}' needs a bool operand, got {}",
            op,
            other.type_name()
        ))),
    }
}

fn resolve_index(target: &Value, index: &Value) -> Result<Value, TickwatchError> {
    let series = match target {
        Value::Series(s) => s,
        other => {
            return Err(eval_error(format!(
                "cannot index into {}",
                other.type_name()
            )));
        }
    };
    let raw = match index {
        Value::Integer(i) => *i,
        Value::Number(n) if n.fract() == 0.0 => *n as i64,
        other => return Err(eval_error(format!("invalid index {}", other))),
    };
    let len = series.len() as i64;
    let idx = if raw < 0 { len + raw } else { raw };
    if idx < 0 || idx >= len {
        return Err(eval_error(format!(
            "index {} out of range for series of length {}",
            raw, len
        )));
    }
    Ok(Value::Number(series[idx as usize]))
}

fn apply_unary(op: UnaryOp, value: Value) -> Result<Value, TickwatchError> {
    match (op, value) {
        (UnaryOp::Neg, Value::Integer(i)) => i
            .checked_neg()
            .map(Value::Integer)
            .ok_or_else(|| eval_error("integer overflow")),
        (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, other) => Err(eval_error(format!("cannot negate {}", other.type_name()))),
        (UnaryOp::Not, other) => Err(eval_error(format!(
            "'!' needs a bool operand, got {}",
            other.type_name()
        ))),
    }
}

fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, TickwatchError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&left, &right))),
        BinaryOp::Ne => Ok(Value::Bool(!values_equal(&left, &right))),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => compare(op, &left, &right),
        BinaryOp::Add => match (left, right) {
            (Value::Text(a), Value::Text(b)) => Ok(Value::Text(a + b.as_str())),
            (l, r) => arithmetic(op, l, r),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem | BinaryOp::Pow => {
            arithmetic(op, left, right)
        }
        BinaryOp::And | BinaryOp::Or => {
            let l = expect_bool(left, op.symbol())?;
            let r = expect_bool(right, op.symbol())?;
            Ok(Value::Bool(if op == BinaryOp::And { l && r } else { l || r }))
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => left == right,
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, TickwatchError> {
    let ordering = match (left, right) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => {
                return Err(eval_error(format!(
                    "cannot compare {} {} {}",
                    left.type_name(),
                    op.symbol(),
                    right.type_name()
                )));
            }
        },
    };
    let result = match ordering {
        // NaN on either side
        None => false,
        Some(ord) => match op {
            BinaryOp::Lt => ord.is_lt(),
            BinaryOp::Le => ord.is_le(),
            BinaryOp::Gt => ord.is_gt(),
            _ => ord.is_ge(),
        },
    };
    Ok(Value::Bool(result))
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> Result<Value, TickwatchError> {
    if let (Value::Integer(a), Value::Integer(b)) = (&left, &right) {
        let (a, b) = (*a, *b);
        let checked = match op {
            BinaryOp::Add => Some(a.checked_add(b)),
            BinaryOp::Sub => Some(a.checked_sub(b)),
            BinaryOp::Mul => Some(a.checked_mul(b)),
            BinaryOp::Rem if b == 0 => return Err(eval_error("modulo by zero")),
            BinaryOp::Rem => Some(a.checked_rem(b)),
            _ => None,
        };
        if let Some(result) = checked {
            return result
                .map(Value::Integer)
                .ok_or_else(|| eval_error("integer overflow"));
        }
    }

    let (a, b) = match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(eval_error(format!(
                "cannot apply '{}' to {} and {}",
                op.symbol(),
                left.type_name(),
                right.type_name()
            )));
        }
    };
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Rem => a % b,
        BinaryOp::Pow => a.powf(b),
        _ => unreachable!("non-arithmetic operator {:?}", op),
    };
    Ok(Value::Number(result))
}
