//! Evaluate a condition against a fact sheet

use tracing::debug;

use super::CliError;
use crate::{ConditionEngine, FactSheet, output, registry::PredicateRegistry};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The condition to evaluate
    pub condition: String,
    /// Facts as a JSON object
    pub facts: Option<String>,
}

/// Result of a check operation
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub satisfied: bool,
    /// Number of top-level clauses the condition parsed into
    pub clauses: usize,
    /// The parsed tree, as printed by `check --explain`
    pub tree: serde_json::Value,
}

/// Parse `options.condition` and evaluate it against the given facts.
///
/// Without facts the condition runs against an empty sheet, so only
/// literals and the built-in predicates can be true.
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    if options.condition.trim().is_empty() {
        return Err(CliError::EmptyCondition);
    }

    let facts = match options.facts.as_deref() {
        Some(json) if !json.trim().is_empty() => FactSheet::from_json_str(json)?,
        _ => FactSheet::new(),
    };
    debug!(facts = facts.len(), "loaded fact sheet");

    let engine = ConditionEngine::new(PredicateRegistry::builder().with(&facts).build());
    let expressions = engine.parse(&options.condition);
    let satisfied = engine.evaluate(&expressions);

    Ok(CheckResult {
        satisfied,
        clauses: expressions.len(),
        tree: output::tree_to_json(&expressions),
    })
}
