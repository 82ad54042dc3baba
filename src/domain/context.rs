//! Variable contexts visible to rule code.
//!
//! A `Context` keeps two views of the same variables: the expression
//! namespace (`Value`, latest scalars) and the script namespace (rhai
//! `Dynamic`, where series names hold the full chronological array).
//! The global context is built once per cycle and only ever receives
//! `<entity>_<name>` keys; each entity gets its own local context with
//! unprefixed names.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rhai::{Array, Dynamic};

use crate::domain::error::TickwatchError;
use crate::domain::expr::Value;
use crate::domain::series::latest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextScope {
    Global,
    Local(String),
}

impl fmt::Display for ContextScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextScope::Global => write!(f, "global"),
            ContextScope::Local(entity) => write!(f, "{}", entity),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Context {
    scope: ContextScope,
    expr: HashMap<String, Value>,
    script: BTreeMap<String, Dynamic>,
}

impl Context {
    pub fn global() -> Self {
        Self::with_scope(ContextScope::Global)
    }

    pub fn local(entity: &str) -> Self {
        Self::with_scope(ContextScope::Local(entity.to_string()))
    }

    fn with_scope(scope: ContextScope) -> Self {
        Self {
            scope,
            expr: HashMap::new(),
            script: BTreeMap::new(),
        }
    }

    pub fn scope(&self) -> &ContextScope {
        &self.scope
    }

    /// Writes the same value into both namespaces.
    pub fn set_scalar(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        self.script.insert(name.to_string(), to_dynamic(&value));
        self.expr.insert(name.to_string(), value);
    }

    /// Writes `scalar` into the expression namespace and the whole series
    /// into the script namespace.
    pub fn set_pair(&mut self, name: &str, scalar: f64, series: &[f64]) {
        self.expr.insert(name.to_string(), Value::Number(scalar));
        self.script
            .insert(name.to_string(), to_dynamic(&Value::Series(series.to_vec())));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.expr.get(name)
    }

    pub fn script_value(&self, name: &str) -> Option<&Dynamic> {
        self.script.get(name)
    }

    pub fn expr_vars(&self) -> &HashMap<String, Value> {
        &self.expr
    }

    pub fn len(&self) -> usize {
        self.expr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expr.is_empty()
    }

    /// A fresh rhai scope holding every script variable as a constant.
    pub fn script_scope(&self) -> rhai::Scope<'static> {
        let mut scope = rhai::Scope::new();
        for (name, value) in &self.script {
            scope.push_constant_dynamic(name.clone(), value.clone());
        }
        scope
    }
}

fn to_dynamic(value: &Value) -> Dynamic {
    match value {
        Value::Number(n) => Dynamic::from_float(*n),
        Value::Integer(i) => Dynamic::from_int(*i),
        Value::Bool(b) => Dynamic::from_bool(*b),
        Value::Text(s) => Dynamic::from(s.clone()),
        Value::Series(s) => {
            Dynamic::from_array(s.iter().map(|&v| Dynamic::from_float(v)).collect::<Array>())
        }
    }
}

pub fn prefixed(entity: &str, name: &str) -> String {
    format!("{}_{}", entity, name)
}

/// Writes one entity's variables into its local context (unprefixed) and
/// into the global context (prefixed with the entity id) in one call.
pub struct EntityWriter<'a> {
    entity: &'a str,
    local: &'a mut Context,
    global: &'a mut Context,
}

impl<'a> EntityWriter<'a> {
    pub fn new(entity: &'a str, local: &'a mut Context, global: &'a mut Context) -> Self {
        Self {
            entity,
            local,
            global,
        }
    }

    pub fn set_scalar(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        self.global
            .set_scalar(&prefixed(self.entity, name), value.clone());
        self.local.set_scalar(name, value);
    }

    /// Returns the latest value written.
    pub fn set_series(&mut self, name: &str, series: &[f64]) -> Result<f64, TickwatchError> {
        let scalar = latest(name, series)?;
        self.local.set_pair(name, scalar, series);
        self.global
            .set_pair(&prefixed(self.entity, name), scalar, series);
        Ok(scalar)
    }
}
