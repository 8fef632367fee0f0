use std::rc::Rc;

use tracing::debug;

use crate::{
    ast::Expression, evaluator::Evaluator, lexer, parser::Parser, registry::PredicateRegistry,
};

/// Owns a predicate registry and runs conditions against it.
///
/// # Examples
///
/// ```
/// use clause_lang::{ConditionEngine, registry::PredicateRegistry};
///
/// let engine = ConditionEngine::new(
///     PredicateRegistry::builder()
///         .bool_variable("IsInTown", |_| Ok(false))
///         .build(),
/// );
///
/// assert!(engine.check("not IsInTown"));
/// assert!(engine.check("IsInTown or true"));
/// ```
#[derive(Debug, Default)]
pub struct ConditionEngine {
    registry: PredicateRegistry,
}

impl ConditionEngine {
    pub fn new(registry: PredicateRegistry) -> Self {
        ConditionEngine { registry }
    }

    pub fn registry(&self) -> &PredicateRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PredicateRegistry {
        &mut self.registry
    }

    pub fn tokenize(&self, input: &str) -> Vec<String> {
        lexer::tokenize(input)
    }

    pub fn parse(&self, input: &str) -> Vec<Expression> {
        Parser::new(input, &self.registry).parse()
    }

    pub fn evaluate(&self, expressions: &[Expression]) -> bool {
        Evaluator::new(&self.registry).evaluate(expressions)
    }

    /// Parse and evaluate in one step.
    pub fn check(&self, input: &str) -> bool {
        self.evaluate(&self.parse(input))
    }

    /// Parse once for repeated evaluation.
    pub fn compile(&self, input: &str) -> CompiledCondition {
        let expressions = self.parse(input);
        if expressions.is_empty() {
            debug!(condition = input, "condition compiled to an empty expression list");
        }
        CompiledCondition {
            source: input.to_string(),
            expressions,
        }
    }

    /// Compile `input` and tie it to a shared engine, for callers that keep
    /// conditions around (queue items, conditional steps).
    pub fn bind(engine: &Rc<ConditionEngine>, input: &str) -> BoundCondition {
        BoundCondition {
            condition: engine.compile(input),
            engine: Rc::clone(engine),
        }
    }
}

/// A parsed condition, ready to be evaluated many times.
#[derive(Debug, Clone)]
pub struct CompiledCondition {
    source: String,
    expressions: Vec<Expression>,
}

impl CompiledCondition {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    pub fn evaluate(&self, engine: &ConditionEngine) -> bool {
        engine.evaluate(&self.expressions)
    }
}

/// A compiled condition carrying the engine it evaluates against.
#[derive(Debug, Clone)]
pub struct BoundCondition {
    engine: Rc<ConditionEngine>,
    condition: CompiledCondition,
}

impl BoundCondition {
    pub fn source(&self) -> &str {
        self.condition.source()
    }

    pub fn is_satisfied(&self) -> bool {
        self.condition.evaluate(&self.engine)
    }
}
