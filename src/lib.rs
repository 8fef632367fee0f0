//! # clause-lang
//!
//! Boolean condition strings, compiled against a table of named predicates,
//! plus a tick-driven queue that runs gated work items one at a time.
//!
//! ```text
//! "HasQuest(1234) and (Level >= 60 or ActorFound(5552))"
//!     -> lexer -> tokens -> parser (+ registry) -> Vec<Expression> -> evaluator -> bool
//! ```
//!
//! # Examples
//!
//! ```
//! use clause_lang::{ConditionEngine, Value, conditions, registry::PredicateRegistry};
//!
//! let registry = PredicateRegistry::builder()
//!     .variable("Level", |expr| conditions::compare_value(expr, &Value::Int(72)))
//!     .bool_method("HasQuest", |expr| Ok(expr.param(0) == Some("1234")))
//!     .build();
//! let engine = ConditionEngine::new(registry);
//!
//! assert!(engine.check("HasQuest(1234) and Level >= 60"));
//! assert!(!engine.check("HasQuest(99) or Level < 10"));
//! ```

pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod conditions;
pub mod engine;
pub mod evaluator;
pub mod facts;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod queue;
pub mod registry;
pub mod value;

pub use ast::{Expression, ExpressionType, Join, Operator, Symbol};
pub use engine::{BoundCondition, CompiledCondition, ConditionEngine};
pub use evaluator::Evaluator;
pub use facts::{FactError, FactSheet};
pub use lexer::{Lexer, tokenize};
pub use parser::Parser;
pub use queue::{BehaviorQueue, QueueConfig, QueueError, QueueItem, TickStatus};
pub use registry::{PredicateError, PredicateKind, PredicateRegistry};
pub use value::Value;
