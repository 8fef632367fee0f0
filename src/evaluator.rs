use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, trace};

use crate::{
    ast::{Expression, ExpressionType, Join},
    registry::{PredicateError, PredicateRegistry, PredicateResult},
};

/// Folds a parsed sibling list into a single boolean.
///
/// Siblings are combined strictly left to right with short-circuiting:
///
/// - an `or` clause reached while the running result is already true, or an
///   `or` clause in first position, makes the whole list true immediately;
/// - an `and` clause reached while the running result is false is skipped
///   (its predicate is not called) and the running result stays false until
///   a later `or` clause rescues it.
///
/// Groups are folded recursively and then combined like any other clause.
/// A predicate that errors, panics, or cannot be found makes its clause
/// false; evaluation of the siblings carries on.
pub struct Evaluator<'r> {
    registry: &'r PredicateRegistry,
}

impl<'r> Evaluator<'r> {
    pub fn new(registry: &'r PredicateRegistry) -> Self {
        Evaluator { registry }
    }

    /// Evaluate a sibling list. An empty list is false.
    pub fn evaluate(&self, expressions: &[Expression]) -> bool {
        let mut running = false;
        let mut first = true;

        for expr in expressions {
            let (join, join_negates) = match expr.join {
                Join::Not => (Join::And, true),
                join => (join, false),
            };

            if join == Join::Or && (running || first) {
                trace!(id = expr.id, "or short-circuit");
                return true;
            }

            if join == Join::And && !running && !first {
                trace!(id = expr.id, "and short-circuit, skipping clause");
                continue;
            }

            let mut this = if expr.is_group() {
                self.evaluate(&expr.children)
            } else {
                self.dispatch(expr)
            };
            if expr.negated {
                this = !this;
            }
            if join_negates {
                this = !this;
            }

            running = match join {
                Join::And => this,
                _ => !running && this,
            };
            first = false;
        }

        running
    }

    /// Evaluate one clause on its own, ignoring its join.
    pub fn evaluate_clause(&self, expr: &Expression) -> bool {
        let result = if expr.is_group() {
            self.evaluate(&expr.children)
        } else {
            self.dispatch(expr)
        };
        result != expr.negated
    }

    /// The single guarded call site for every predicate.
    fn dispatch(&self, expr: &Expression) -> bool {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.call(expr)));

        match outcome {
            Ok(Ok(result)) => {
                trace!(id = expr.id, predicate = %expr.method_name, result, "predicate evaluated");
                result
            }
            Ok(Err(e)) => {
                error!(id = expr.id, clause = %expr, error = %e, "predicate failed");
                false
            }
            Err(payload) => {
                error!(
                    id = expr.id,
                    clause = %expr,
                    panic = %panic_message(payload.as_ref()),
                    "predicate panicked"
                );
                false
            }
        }
    }

    fn call(&self, expr: &Expression) -> PredicateResult {
        if let Some(predicate) = self.registry.get(&expr.method_name) {
            return predicate(expr);
        }

        if expr.kind == ExpressionType::Namespace
            && let Some(external) = self.registry.external()
            && external.contains(&expr.method_name)
        {
            return external.evaluate(&expr.method_name, expr);
        }

        Err(PredicateError::Unknown(expr.method_name.clone()))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
