//! Named predicates that condition strings can call.
//!
//! Predicates are registered once at startup, each under a name and a
//! [`PredicateKind`] that decides which clause shape the parser accepts for
//! it. Registration is explicit: hand-written predicates go through
//! [`RegistryBuilder`], and whole families of predicates can be installed
//! together through [`ConditionSet`].
//!
//! # Name matching
//!
//! - `Variable`, `Method` and `Namespace` names match exactly
//!   (case-insensitive).
//! - `BoolVariable` and `BoolMethod` names also match partially: a token
//!   that *contains* a registered name resolves to it. When several names
//!   are contained in the token the longest wins, then the earliest
//!   registered.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::ast::{Expression, ExpressionType};
use crate::conditions;

/// Errors a predicate can report. The evaluator logs them and treats the
/// clause as false.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredicateError {
    #[error("unknown predicate '{0}'")]
    Unknown(String),

    #[error("{predicate}: missing parameter #{index}")]
    MissingParam { predicate: String, index: usize },

    #[error("{predicate}: invalid parameter '{value}': {reason}")]
    InvalidParam {
        predicate: String,
        value: String,
        reason: String,
    },

    #[error("{predicate}: cannot compare {observed} with '{expected}'")]
    Incomparable {
        predicate: String,
        observed: String,
        expected: String,
    },

    #[error("{predicate} failed: {message}")]
    Failed { predicate: String, message: String },
}

pub type PredicateResult = Result<bool, PredicateError>;

/// A registered predicate. It receives the whole clause so it can read
/// `params`, `operator` and `value`.
pub type PredicateFn = Box<dyn Fn(&Expression) -> PredicateResult>;

/// Declared clause shape of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PredicateKind {
    /// `Name OP value`
    Variable,
    /// `Name`
    BoolVariable,
    /// `Name(args) OP value`
    Method,
    /// `Name(args)`
    BoolMethod,
    /// `Name.Member [(args)] [OP value]`
    Namespace,
}

impl PredicateKind {
    pub fn expression_type(self) -> ExpressionType {
        match self {
            PredicateKind::Variable => ExpressionType::Variable,
            PredicateKind::BoolVariable => ExpressionType::BoolVariable,
            PredicateKind::Method => ExpressionType::Method,
            PredicateKind::BoolMethod => ExpressionType::BoolMethod,
            PredicateKind::Namespace => ExpressionType::Namespace,
        }
    }

    fn matches_partially(self) -> bool {
        matches!(self, PredicateKind::BoolVariable | PredicateKind::BoolMethod)
    }
}

/// Bridge to conditions owned by the embedding host.
///
/// Dotted clause names that no local namespace claims are offered to the
/// bridge; if it `contains` the name, the clause is dispatched to
/// `evaluate` at evaluation time.
pub trait ExternalConditions {
    fn contains(&self, name: &str) -> bool;

    fn evaluate(&self, name: &str, expr: &Expression) -> PredicateResult;
}

/// A family of predicates installed into a registry in one go.
pub trait ConditionSet {
    fn install(&self, builder: RegistryBuilder) -> RegistryBuilder;
}

struct Entry {
    name: String,
    kind: PredicateKind,
    func: PredicateFn,
}

/// Name to predicate table consulted by both the parser and the evaluator.
pub struct PredicateRegistry {
    entries: Vec<Entry>,
    /// Lower-cased name -> position in `entries`.
    index: HashMap<String, usize>,
    external: Option<Box<dyn ExternalConditions>>,
}

impl fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateRegistry")
            .field("predicates", &self.names().collect::<Vec<_>>())
            .field("external", &self.external.is_some())
            .finish()
    }
}

impl Default for PredicateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PredicateRegistry {
    /// A registry holding only the built-in predicates.
    pub fn new() -> Self {
        let mut registry = PredicateRegistry {
            entries: Vec::new(),
            index: HashMap::new(),
            external: None,
        };
        conditions::register_builtins(&mut registry);
        registry
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            registry: PredicateRegistry::new(),
        }
    }

    /// Register `func` under `name`, replacing any predicate of the same name.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        kind: PredicateKind,
        func: impl Fn(&Expression) -> PredicateResult + 'static,
    ) {
        let name = name.into();
        let key = name.to_lowercase();
        let entry = Entry {
            name,
            kind,
            func: Box::new(func),
        };

        match self.index.get(&key) {
            Some(&pos) => {
                warn!(predicate = %entry.name, "replacing previously registered predicate");
                self.entries[pos] = entry;
            }
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn set_external(&mut self, external: Box<dyn ExternalConditions>) {
        self.external = Some(external);
    }

    pub fn external(&self) -> Option<&dyn ExternalConditions> {
        self.external.as_deref()
    }

    fn entry(&self, name: &str) -> Option<&Entry> {
        self.index
            .get(&name.to_lowercase())
            .map(|&pos| &self.entries[pos])
    }

    /// Look up a predicate by its canonical (or any-case) name.
    pub fn get(&self, name: &str) -> Option<&PredicateFn> {
        self.entry(name).map(|e| &e.func)
    }

    pub fn kind_of(&self, name: &str) -> Option<PredicateKind> {
        self.entry(name).map(|e| e.kind)
    }

    /// True if `token` is exactly some registered name.
    pub fn is_known(&self, token: &str) -> bool {
        self.index.contains_key(&token.to_lowercase())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `token` against predicates of one `kind`, returning the
    /// canonical registered name.
    pub fn resolve(&self, kind: PredicateKind, token: &str) -> Option<&str> {
        if kind == PredicateKind::Namespace {
            let (prefix, _) = token.split_once('.')?;
            return self
                .entry(prefix)
                .filter(|e| e.kind == PredicateKind::Namespace)
                .map(|e| e.name.as_str());
        }

        if let Some(entry) = self.entry(token).filter(|e| e.kind == kind) {
            return Some(entry.name.as_str());
        }

        if !kind.matches_partially() {
            return None;
        }

        let lowered = token.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.kind == kind && lowered.contains(&e.name.to_lowercase()))
            .fold(None::<&Entry>, |best, e| match best {
                Some(b) if b.name.len() >= e.name.len() => Some(b),
                _ => Some(e),
            })
            .map(|e| e.name.as_str())
    }

    /// Decide which clause shape `token` starts, and the name it dispatches to.
    ///
    /// Dotted tokens are namespace clauses first: a local namespace owning
    /// the prefix, then the external bridge. Otherwise, in order: variables,
    /// boolean variables, methods, boolean methods.
    pub fn classify(&self, token: &str) -> Option<(ExpressionType, String)> {
        const ORDER: [PredicateKind; 4] = [
            PredicateKind::Variable,
            PredicateKind::BoolVariable,
            PredicateKind::Method,
            PredicateKind::BoolMethod,
        ];

        if token.contains('.') {
            if let Some(name) = self.resolve(PredicateKind::Namespace, token) {
                return Some((ExpressionType::Namespace, name.to_string()));
            }
            if self.external.as_ref().is_some_and(|e| e.contains(token)) {
                return Some((ExpressionType::Namespace, token.to_string()));
            }
        }

        ORDER.into_iter().find_map(|kind| {
            self.resolve(kind, token)
                .map(|name| (kind.expression_type(), name.to_string()))
        })
    }
}

/// Builder for a [`PredicateRegistry`] seeded with the built-ins.
///
/// # Examples
///
/// ```
/// use clause_lang::registry::PredicateRegistry;
///
/// let registry = PredicateRegistry::builder()
///     .bool_variable("IsInTown", |_| Ok(true))
///     .variable("Level", |expr| Ok(expr.value == "60"))
///     .build();
///
/// assert!(registry.is_known("isintown"));
/// ```
pub struct RegistryBuilder {
    registry: PredicateRegistry,
}

impl RegistryBuilder {
    pub fn predicate(
        mut self,
        name: impl Into<String>,
        kind: PredicateKind,
        func: impl Fn(&Expression) -> PredicateResult + 'static,
    ) -> Self {
        self.registry.register(name, kind, func);
        self
    }

    pub fn variable(
        self,
        name: impl Into<String>,
        func: impl Fn(&Expression) -> PredicateResult + 'static,
    ) -> Self {
        self.predicate(name, PredicateKind::Variable, func)
    }

    pub fn bool_variable(
        self,
        name: impl Into<String>,
        func: impl Fn(&Expression) -> PredicateResult + 'static,
    ) -> Self {
        self.predicate(name, PredicateKind::BoolVariable, func)
    }

    pub fn method(
        self,
        name: impl Into<String>,
        func: impl Fn(&Expression) -> PredicateResult + 'static,
    ) -> Self {
        self.predicate(name, PredicateKind::Method, func)
    }

    pub fn bool_method(
        self,
        name: impl Into<String>,
        func: impl Fn(&Expression) -> PredicateResult + 'static,
    ) -> Self {
        self.predicate(name, PredicateKind::BoolMethod, func)
    }

    pub fn namespace(
        self,
        name: impl Into<String>,
        func: impl Fn(&Expression) -> PredicateResult + 'static,
    ) -> Self {
        self.predicate(name, PredicateKind::Namespace, func)
    }

    pub fn external(mut self, external: impl ExternalConditions + 'static) -> Self {
        self.registry.set_external(Box::new(external));
        self
    }

    pub fn with(self, set: &impl ConditionSet) -> Self {
        set.install(self)
    }

    pub fn build(self) -> PredicateRegistry {
        self.registry
    }
}
