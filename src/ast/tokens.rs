use std::str::FromStr;

/// Operator symbols understood by the condition language.
///
/// Symbolic and word forms map to the same variant, and word forms are
/// matched case-insensitively.
///
/// # Examples
/// ```
/// use clause_lang::ast::Symbol;
///
/// assert_eq!(Symbol::parse("&&"), Some(Symbol::And));
/// assert_eq!(Symbol::parse("AND"), Some(Symbol::And));
/// assert_eq!(Symbol::parse(">="), Some(Symbol::GreaterThanEqual));
/// assert_eq!(Symbol::parse("Level"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum Symbol {
    // Logical
    /// Logical AND (`and`, `&&`)
    #[strum(to_string = "and", serialize = "&&")]
    And,

    /// Logical OR (`or`, `||`)
    #[strum(to_string = "or", serialize = "||")]
    Or,

    /// Negation of the following clause (`not`)
    #[strum(to_string = "not")]
    Not,

    // Comparison
    /// Equality operator
    #[strum(to_string = "==")]
    Equal,

    /// Inequality operator
    #[strum(to_string = "!=")]
    NotEqual,

    /// Less than
    #[strum(to_string = "<")]
    LessThan,

    /// Less than or equal
    #[strum(to_string = "<=")]
    LessThanEqual,

    /// Greater than
    #[strum(to_string = ">")]
    GreaterThan,

    /// Greater than or equal
    #[strum(to_string = ">=")]
    GreaterThanEqual,

    // Delimiters
    /// Left parenthesis for grouping or argument lists
    #[strum(to_string = "(")]
    LParen,

    /// Right parenthesis
    #[strum(to_string = ")")]
    RParen,
}

/// Every symbolic (non-word) operator the lexer recognises.
pub const SYMBOLIC_OPERATORS: [&str; 10] = ["&&", "||", "==", "!=", "<", "<=", ">", ">=", "(", ")"];

impl Symbol {
    /// Classify a token as an operator symbol.
    pub fn parse(token: &str) -> Option<Self> {
        Symbol::from_str(token).ok()
    }

    /// True for `==`, `!=`, `<`, `<=`, `>`, `>=`.
    pub fn is_comparator(self) -> bool {
        matches!(
            self,
            Symbol::Equal
                | Symbol::NotEqual
                | Symbol::LessThan
                | Symbol::LessThanEqual
                | Symbol::GreaterThan
                | Symbol::GreaterThanEqual
        )
    }
}

/// True if `c` appears in any symbolic operator.
pub fn is_operator_char(c: char) -> bool {
    SYMBOLIC_OPERATORS.iter().any(|op| op.contains(c))
}

/// True if `candidate` is a prefix of at least one symbolic operator.
///
/// The lexer grows an operator buffer only while this holds, so `>` `=`
/// combine into `>=` but `>` `>` do not.
pub fn is_operator_prefix(candidate: &str) -> bool {
    SYMBOLIC_OPERATORS.iter().any(|op| op.starts_with(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_forms_are_case_insensitive() {
        assert_eq!(Symbol::parse("Or"), Some(Symbol::Or));
        assert_eq!(Symbol::parse("NOT"), Some(Symbol::Not));
        assert_eq!(Symbol::parse("||"), Some(Symbol::Or));
    }

    #[test]
    fn display_uses_canonical_form() {
        assert_eq!(Symbol::And.to_string(), "and");
        assert_eq!(Symbol::LessThanEqual.to_string(), "<=");
    }

    #[test]
    fn prefix_testing() {
        assert!(is_operator_prefix(">"));
        assert!(is_operator_prefix(">="));
        assert!(!is_operator_prefix(">>"));
        assert!(!is_operator_prefix("(("));
        assert!(is_operator_char('!'));
        assert!(!is_operator_char('a'));
    }
}
