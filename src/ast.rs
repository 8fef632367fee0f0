//! # Clause Condition Language - Expression Tree
//!
//! This module defines the tree the parser builds out of a condition string
//! and the evaluator walks to produce a single boolean.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Operator vocabulary recognised by the lexer and parser
//! - **[operators]** - Comparison operators and sibling joins
//! - **[expressions]** - The [`Expression`] clause node and its [`ExpressionType`]
//!
//! ## Quick Start
//!
//! ```text
//! HasQuest(1234) and (Level >= 60 or ActorFound(5552))
//! ```
//!
//! parses into two root siblings: the `HasQuest` clause, and a group whose
//! children are the `Level` comparison and the `ActorFound` call joined by OR.
//!
//! ## Core Concepts
//!
//! ### Clause shapes
//!
//! - **Variable** `Name OP value` - a no-argument predicate compared against a literal
//! - **BoolVariable** `Name` - a no-argument predicate that is itself a boolean
//! - **Method** `Name(a, b) OP value` - a parameterised predicate compared against a literal
//! - **BoolMethod** `Name(a, b)` - a parameterised boolean predicate
//! - **Namespace** `Ns.Member [(args)] [OP value]` - dispatched by namespace prefix
//! - **Group** `( ... )` - a parenthesised sub-list evaluated as a unit
//! - **Boolean** `true` / `false`
//!
//! ### Joins
//!
//! Each clause records how it relates to its *previous* sibling (`and` / `or`)
//! and whether it was preceded by `not`. There is no precedence: a sibling
//! list is folded strictly left to right.
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::{Expression, ExpressionType};
pub use operators::{Join, Operator};
pub use tokens::Symbol;
