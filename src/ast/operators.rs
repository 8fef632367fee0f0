use crate::ast::Symbol;

/// Comparison operator between a predicate's observed value and the
/// clause's literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum Operator {
    /// Equal (`==`)
    #[strum(to_string = "==")]
    Equal,
    /// Not equal (`!=`)
    #[strum(to_string = "!=")]
    NotEqual,
    /// Less than (`<`)
    #[strum(to_string = "<")]
    LessThan,
    /// Less than or equal (`<=`)
    #[strum(to_string = "<=")]
    LessThanEqual,
    /// Greater than (`>`)
    #[strum(to_string = ">")]
    GreaterThan,
    /// Greater than or equal (`>=`)
    #[strum(to_string = ">=")]
    GreaterThanEqual,
    /// No comparison attached to the clause
    #[default]
    #[strum(to_string = "?")]
    Unknown,
}

impl Operator {
    /// Map a comparator symbol to its operator. Non-comparators map to `Unknown`.
    pub fn from_symbol(symbol: Symbol) -> Self {
        match symbol {
            Symbol::Equal => Operator::Equal,
            Symbol::NotEqual => Operator::NotEqual,
            Symbol::LessThan => Operator::LessThan,
            Symbol::LessThanEqual => Operator::LessThanEqual,
            Symbol::GreaterThan => Operator::GreaterThan,
            Symbol::GreaterThanEqual => Operator::GreaterThanEqual,
            _ => Operator::Unknown,
        }
    }

    /// Apply the operator to an ordering of `actual` relative to `expected`.
    pub fn matches(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Operator::Equal => ordering == Equal,
            Operator::NotEqual => ordering != Equal,
            Operator::LessThan => ordering == Less,
            Operator::LessThanEqual => ordering != Greater,
            Operator::GreaterThan => ordering == Greater,
            Operator::GreaterThanEqual => ordering != Less,
            Operator::Unknown => false,
        }
    }
}

/// How a clause combines with its previous sibling.
///
/// The first sibling of a list is always recorded as `And`, which folds as
/// "vacuously true AND this clause".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Join {
    #[default]
    And,
    Or,
    /// Legacy spelling of `and not`; the evaluator treats it as a negated `And`.
    Not,
}

impl Join {
    pub fn from_symbol(symbol: Symbol) -> Option<Self> {
        match symbol {
            Symbol::And => Some(Join::And),
            Symbol::Or => Some(Join::Or),
            _ => None,
        }
    }
}
