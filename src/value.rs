use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

/// A scalar value on either side of a clause comparison.
///
/// Condition literals are stored as raw text on the [`Expression`] and
/// coerced into a `Value` at evaluation time; predicates produce a `Value`
/// for what they observe and the two are compared with [`Value::compare`].
///
/// # Type Coercion
///
/// [`Value::coerce`] tries, in order: boolean (`true`/`false`,
/// case-insensitive), integer, decimal float, and falls back to a string.
///
/// # Examples
///
/// ```
/// use clause_lang::Value;
///
/// assert_eq!(Value::coerce("60"), Value::Int(60));
/// assert_eq!(Value::coerce("TRUE"), Value::Bool(true));
/// assert_eq!(Value::coerce("1.5"), Value::Float(1.5));
/// assert_eq!(Value::coerce("Town"), Value::Str("Town".to_string()));
/// ```
///
/// [`Expression`]: crate::ast::Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    /// Coerce a literal into its most specific type.
    pub fn coerce(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if raw.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Int(n);
        }
        if let Ok(d) = Decimal::from_str(raw)
            && let Some(f) = d.to_f64()
        {
            return Value::Float(f);
        }
        Value::Str(raw.to_string())
    }

    /// Human-readable type name, used in predicate error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
        }
    }

    /// Get as integer. Floats convert only when they are whole.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Get as an exact decimal, for numeric comparison without float drift.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Int(n) => Decimal::from_i64(*n),
            Value::Float(f) => Decimal::from_f64(*f),
            Value::Str(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(n) => Some(*n != 0),
            Value::Str(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Value::Str(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }

    /// Get as string (for case-insensitive string comparison)
    pub fn as_string(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
        }
    }

    /// Order `self` relative to `other`.
    ///
    /// Numbers compare numerically across `Int`/`Float`, booleans compare as
    /// booleans, and anything involving a string compares case-insensitively
    /// as text. Returns `None` when the two sides cannot be ordered, e.g. a
    /// boolean against a number.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                match (self.as_decimal(), other.as_decimal()) {
                    (Some(a), Some(b)) => Some(a.cmp(&b)),
                    _ => self.as_float()?.partial_cmp(&other.as_float()?),
                }
            }
            (Value::Str(_), _) | (_, Value::Str(_)) => Some(
                self.as_string()
                    .to_lowercase()
                    .cmp(&other.as_string().to_lowercase()),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
