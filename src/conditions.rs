//! Comparison helpers for predicate authors, and the built-in predicates.
//!
//! A comparison predicate typically looks up what it observes and hands it
//! to [`compare_value`], which applies the clause's operator against the
//! clause's literal:
//!
//! ```
//! use clause_lang::{conditions, registry::PredicateRegistry, ConditionEngine, Value};
//!
//! let registry = PredicateRegistry::builder()
//!     .variable("Level", |expr| conditions::compare_value(expr, &Value::Int(61)))
//!     .build();
//! let engine = ConditionEngine::new(registry);
//!
//! assert!(engine.check("Level >= 60"));
//! assert!(!engine.check("Level < 60"));
//! ```

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::{Decimal, prelude::FromPrimitive};
use tracing::debug;

use crate::ast::{Expression, Operator};
use crate::registry::{PredicateError, PredicateKind, PredicateRegistry, PredicateResult};
use crate::value::Value;

/// Name the parser dispatches `true` / `false` literals to.
pub const GET_BOOLEAN: &str = "GetBoolean";

/// Integer comparison; supports every operator.
pub fn eval_int(op: Operator, actual: i64, expected: i64) -> bool {
    op.matches(actual.cmp(&expected))
}

/// Float comparison through exact decimals; supports every operator.
pub fn eval_float(op: Operator, actual: f64, expected: f64) -> bool {
    match (Decimal::from_f64(actual), Decimal::from_f64(expected)) {
        (Some(a), Some(b)) => op.matches(a.cmp(&b)),
        _ => actual
            .partial_cmp(&expected)
            .is_some_and(|ordering| op.matches(ordering)),
    }
}

/// Case-insensitive string comparison. Only `==` and `!=` are meaningful;
/// ordering operators yield false.
pub fn eval_string(op: Operator, actual: &str, expected: &str) -> bool {
    let equal = actual.to_lowercase() == expected.to_lowercase();
    match op {
        Operator::Equal => equal,
        Operator::NotEqual => !equal,
        other => {
            debug!(operator = %other, "strings only support == and !=");
            false
        }
    }
}

/// Boolean comparison; only `==` and `!=` are meaningful.
pub fn eval_bool(op: Operator, actual: bool, expected: bool) -> bool {
    match op {
        Operator::Equal => actual == expected,
        Operator::NotEqual => actual != expected,
        other => {
            debug!(operator = %other, "booleans only support == and !=");
            false
        }
    }
}

/// Compare what a predicate observed against the clause's `operator` and
/// `value`.
///
/// Booleans compare as booleans, values that both read as numbers compare
/// numerically, and everything else compares as case-insensitive text.
pub fn compare_value(expr: &Expression, observed: &Value) -> PredicateResult {
    if expr.operator == Operator::Unknown {
        return Err(PredicateError::Failed {
            predicate: expr.method_name.clone(),
            message: "clause has no comparison operator".to_string(),
        });
    }

    let expected = expr.typed_value();
    let incomparable = || PredicateError::Incomparable {
        predicate: expr.method_name.clone(),
        observed: observed.to_string(),
        expected: expr.value.clone(),
    };

    if matches!(observed, Value::Bool(_)) || matches!(expected, Value::Bool(_)) {
        let (Some(actual), Some(wanted)) = (observed.as_bool(), expected.as_bool()) else {
            return Err(incomparable());
        };
        return Ok(eval_bool(expr.operator, actual, wanted));
    }

    if let (Value::Int(actual), Value::Int(wanted)) = (observed, &expected) {
        return Ok(eval_int(expr.operator, *actual, *wanted));
    }

    if let (Some(actual), Some(wanted)) = (observed.as_decimal(), expected.as_decimal()) {
        return Ok(expr.operator.matches(actual.cmp(&wanted)));
    }

    Ok(eval_string(
        expr.operator,
        &observed.as_string(),
        &expected.as_string(),
    ))
}

/// Parse parameter `index` of a method-style clause.
pub fn param<T>(expr: &Expression, index: usize) -> Result<T, PredicateError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = expr.param(index).ok_or_else(|| PredicateError::MissingParam {
        predicate: expr.method_name.clone(),
        index,
    })?;
    raw.trim().parse().map_err(|e: T::Err| PredicateError::InvalidParam {
        predicate: expr.method_name.clone(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

fn get_boolean(expr: &Expression) -> PredicateResult {
    Value::coerce(&expr.value)
        .as_bool()
        .ok_or_else(|| PredicateError::InvalidParam {
            predicate: GET_BOOLEAN.to_string(),
            value: expr.value.clone(),
            reason: "not a boolean literal".to_string(),
        })
}

pub(crate) fn register_builtins(registry: &mut PredicateRegistry) {
    registry.register(GET_BOOLEAN, PredicateKind::BoolVariable, get_boolean);
}
