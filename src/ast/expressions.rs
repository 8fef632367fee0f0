use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::ast::{Join, Operator};
use crate::value::Value;

static NEXT_EXPRESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Parse and evaluation strategy of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum ExpressionType {
    #[default]
    Unknown,
    /// `Name OP value`
    Variable,
    /// `Ns.Member [(args)] [OP value]`
    Namespace,
    /// `true` / `false`
    Boolean,
    /// `Name`
    BoolVariable,
    /// `Name(args) OP value`
    Method,
    /// `Name(args)`
    BoolMethod,
    /// `( ... )`
    Group,
}

impl ExpressionType {
    /// Kinds that must carry an operator and a value.
    pub fn requires_comparison(self) -> bool {
        matches!(self, ExpressionType::Variable | ExpressionType::Method)
    }

    /// Kinds that must be followed by a parenthesised argument list.
    pub fn requires_params(self) -> bool {
        matches!(self, ExpressionType::Method | ExpressionType::BoolMethod)
    }
}

/// One parsed clause of a condition.
///
/// Non-group clauses name the predicate to dispatch to in `method_name`;
/// predicates read `params`, `operator` and `value` straight off the node.
/// Group clauses carry their sub-list in `children`, and their own `join` and
/// `negated` apply to the folded result of that sub-list.
#[derive(Debug, Clone)]
pub struct Expression {
    /// Process-unique identifier, used for log correlation only.
    pub id: u64,

    /// Predicate or variable name as written.
    pub keyword: String,

    pub kind: ExpressionType,

    /// Relation to the previous sibling.
    pub join: Join,

    /// Whether `not` preceded the clause.
    pub negated: bool,

    /// Canonical registered name the clause dispatches to.
    pub method_name: String,

    pub operator: Operator,

    /// Right-hand literal, coerced lazily through [`Expression::typed_value`].
    pub value: String,

    /// Arguments of method-style clauses, in order.
    pub params: Vec<String>,

    /// Sub-clauses of a group. Always empty for non-group kinds.
    pub children: Vec<Expression>,
}

impl Expression {
    pub fn new(kind: ExpressionType, keyword: impl Into<String>) -> Self {
        Expression {
            id: NEXT_EXPRESSION_ID.fetch_add(1, Ordering::Relaxed),
            keyword: keyword.into(),
            kind,
            join: Join::And,
            negated: false,
            method_name: String::new(),
            operator: Operator::Unknown,
            value: String::new(),
            params: Vec::new(),
            children: Vec::new(),
        }
    }

    /// An empty group, ready to receive children.
    pub fn group() -> Self {
        Expression::new(ExpressionType::Group, "(")
    }

    pub fn is_group(&self) -> bool {
        self.kind == ExpressionType::Group
    }

    pub fn has_comparison(&self) -> bool {
        self.operator != Operator::Unknown && !self.value.is_empty()
    }

    /// The right-hand literal as a typed value.
    pub fn typed_value(&self) -> Value {
        Value::coerce(&self.value)
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }

    /// For namespace clauses, the part of the keyword after the first `.`.
    ///
    /// ```
    /// use clause_lang::ast::{Expression, ExpressionType};
    ///
    /// let expr = Expression::new(ExpressionType::Namespace, "Facts.level");
    /// assert_eq!(expr.member(), Some("level"));
    /// ```
    pub fn member(&self) -> Option<&str> {
        self.keyword.split_once('.').map(|(_, member)| member)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "not ")?;
        }

        if self.is_group() {
            write!(f, "(")?;
            for (i, child) in self.children.iter().enumerate() {
                if i > 0 {
                    write!(f, " {} ", child.join)?;
                }
                write!(f, "{}", child)?;
            }
            return write!(f, ")");
        }

        write!(f, "{}", self.keyword)?;
        if self.kind.requires_params() || !self.params.is_empty() {
            write!(f, "({})", self.params.join(", "))?;
        }
        if self.kind != ExpressionType::Boolean && self.has_comparison() {
            write!(f, " {} {}", self.operator, self.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = Expression::new(ExpressionType::BoolVariable, "A");
        let b = Expression::new(ExpressionType::BoolVariable, "A");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn display_renders_clause_shapes() {
        let mut method = Expression::new(ExpressionType::Method, "ItemCount");
        method.params = vec!["1234".into()];
        method.operator = Operator::GreaterThanEqual;
        method.value = "5".into();
        assert_eq!(method.to_string(), "ItemCount(1234) >= 5");

        let mut flag = Expression::new(ExpressionType::BoolVariable, "IsInTown");
        flag.negated = true;
        let mut other = Expression::new(ExpressionType::BoolVariable, "IsDead");
        other.join = Join::Or;
        let mut group = Expression::group();
        group.children = vec![flag, other];
        assert_eq!(group.to_string(), "(not IsInTown or IsDead)");
    }
}
