//! A shared table of named facts with generic predicates over it.
//!
//! Hosts that cannot (or do not want to) write a predicate per query can
//! publish their world state as facts and let conditions read them:
//!
//! ```text
//! Fact(level) >= 60 and not IsSet(in_town)
//! Contains(quests, 1234) or Facts.zone == 'Harbor'
//! Matches(target, '^Elite ')
//! ```
//!
//! The sheet is reference-counted: clones share the same table, so the
//! predicates installed in a registry see every later [`FactSheet::set`].

use std::cell::RefCell;
use std::rc::Rc;

use regex::Regex;
use serde_json::{Map, Value as Json};
use thiserror::Error;

use crate::{
    ast::{Expression, Operator},
    conditions::{self, compare_value},
    registry::{ConditionSet, PredicateError, PredicateResult, RegistryBuilder},
    value::Value,
};

/// Namespace under which facts are readable as `Facts.<name>`.
pub const FACTS_NAMESPACE: &str = "Facts";

#[derive(Debug, Error)]
pub enum FactError {
    #[error("invalid fact JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("facts must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

#[derive(Debug, Clone, Default)]
pub struct FactSheet {
    facts: Rc<RefCell<Map<String, Json>>>,
}

fn json_type(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Convert a scalar JSON value. Null, arrays and objects have no scalar form.
pub fn scalar(value: &Json) -> Option<Value> {
    match value {
        Json::Bool(b) => Some(Value::Bool(*b)),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Some(Value::Int(i)),
            None => n.as_f64().map(Value::Float),
        },
        Json::String(s) => Some(Value::Str(s.clone())),
        _ => None,
    }
}

fn is_truthy(value: &Json) -> bool {
    match value {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Json::String(s) => !s.is_empty(),
        Json::Array(arr) => !arr.is_empty(),
        Json::Object(obj) => !obj.is_empty(),
    }
}

fn same_item(item: &Json, wanted: &str) -> bool {
    match scalar(item) {
        Some(Value::Str(s)) => s.eq_ignore_ascii_case(wanted),
        Some(v) => v.compare(&Value::coerce(wanted)) == Some(std::cmp::Ordering::Equal),
        None => false,
    }
}

impl FactSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(value: Json) -> Result<Self, FactError> {
        match value {
            Json::Object(map) => Ok(FactSheet {
                facts: Rc::new(RefCell::new(map)),
            }),
            other => Err(FactError::NotAnObject(json_type(&other))),
        }
    }

    pub fn from_json_str(input: &str) -> Result<Self, FactError> {
        Self::from_json(serde_json::from_str(input)?)
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<Json>) {
        self.facts.borrow_mut().insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) -> Option<Json> {
        self.facts.borrow_mut().remove(name)
    }

    /// Look a fact up by name; an exact match wins over a case-insensitive one.
    pub fn get(&self, name: &str) -> Option<Json> {
        let facts = self.facts.borrow();
        facts.get(name).cloned().or_else(|| {
            facts
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.clone())
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.facts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.borrow().is_empty()
    }

    fn require(&self, expr: &Expression, name: &str) -> Result<Json, PredicateError> {
        self.get(name).ok_or_else(|| PredicateError::Failed {
            predicate: expr.method_name.clone(),
            message: format!("no fact named '{name}'"),
        })
    }

    fn require_scalar(&self, expr: &Expression, name: &str) -> Result<Value, PredicateError> {
        let fact = self.require(expr, name)?;
        scalar(&fact).ok_or_else(|| PredicateError::Failed {
            predicate: expr.method_name.clone(),
            message: format!("fact '{name}' is a {}, not a scalar", json_type(&fact)),
        })
    }

    fn fact(&self, expr: &Expression) -> PredicateResult {
        let name: String = conditions::param(expr, 0)?;
        compare_value(expr, &self.require_scalar(expr, &name)?)
    }

    fn has_fact(&self, expr: &Expression) -> PredicateResult {
        let name: String = conditions::param(expr, 0)?;
        Ok(self.contains(&name))
    }

    fn is_set(&self, expr: &Expression) -> PredicateResult {
        let name: String = conditions::param(expr, 0)?;
        Ok(self.get(&name).is_some_and(|fact| is_truthy(&fact)))
    }

    fn matches(&self, expr: &Expression) -> PredicateResult {
        let name: String = conditions::param(expr, 0)?;
        let pattern: String = conditions::param(expr, 1)?;
        let regex = Regex::new(&pattern).map_err(|e| PredicateError::InvalidParam {
            predicate: expr.method_name.clone(),
            value: pattern.clone(),
            reason: e.to_string(),
        })?;
        Ok(regex.is_match(&self.require_scalar(expr, &name)?.as_string()))
    }

    fn contains_item(&self, expr: &Expression) -> PredicateResult {
        let name: String = conditions::param(expr, 0)?;
        let item: String = conditions::param(expr, 1)?;
        match self.require(expr, &name)? {
            Json::Array(items) => Ok(items.iter().any(|i| same_item(i, &item))),
            Json::Object(map) => Ok(map.keys().any(|k| k.eq_ignore_ascii_case(&item))),
            Json::String(s) => Ok(s.to_lowercase().contains(&item.to_lowercase())),
            other => Err(PredicateError::Failed {
                predicate: expr.method_name.clone(),
                message: format!("fact '{name}' is a {}, not a collection", json_type(&other)),
            }),
        }
    }

    fn namespace(&self, expr: &Expression) -> PredicateResult {
        let Some(name) = expr.member() else {
            return Err(PredicateError::Failed {
                predicate: expr.method_name.clone(),
                message: "missing fact name after the namespace".to_string(),
            });
        };

        if expr.operator == Operator::Unknown {
            return Ok(self.get(name).is_some_and(|fact| is_truthy(&fact)));
        }
        compare_value(expr, &self.require_scalar(expr, name)?)
    }
}

impl ConditionSet for FactSheet {
    fn install(&self, builder: RegistryBuilder) -> RegistryBuilder {
        let (fact, has, set, matches, contains, ns) = (
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
        );

        builder
            .method("Fact", move |expr| fact.fact(expr))
            .bool_method("HasFact", move |expr| has.has_fact(expr))
            .bool_method("IsSet", move |expr| set.is_set(expr))
            .bool_method("Matches", move |expr| matches.matches(expr))
            .bool_method("Contains", move |expr| contains.contains_item(expr))
            .namespace(FACTS_NAMESPACE, move |expr| ns.namespace(expr))
    }
}
