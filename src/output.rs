//! Debug renderings of token streams and parsed condition trees.
//!
//! Two forms are available:
//!
//! - **JSON** via [`tokens_to_json()`] and [`tree_to_json()`], handy for
//!   tooling and snapshot comparisons
//! - **Outline** via [`outline()`], an indented one-clause-per-line listing
//!
//! # Examples
//!
//! ```
//! use clause_lang::{ConditionEngine, output};
//!
//! let engine = ConditionEngine::default();
//! let tree = engine.parse("true and (false or true)");
//!
//! let text = output::outline(&tree);
//! assert_eq!(text, "and true\nand (group)\n  and false\n  or  true\n");
//!
//! let json = output::tree_to_json(&tree);
//! assert_eq!(json[1]["children"][1]["join"], "or");
//! ```

use serde_json::{Value as Json, json};

use crate::ast::{Expression, ExpressionType, Operator};

pub fn tokens_to_json(tokens: &[String]) -> Json {
    Json::Array(tokens.iter().cloned().map(Json::String).collect())
}

/// One clause as a JSON object. Groups nest their children.
pub fn expression_to_json(expr: &Expression) -> Json {
    let mut node = json!({
        "id": expr.id,
        "kind": expr.kind.to_string(),
        "join": expr.join.to_string(),
        "negated": expr.negated,
    });

    if expr.is_group() {
        node["children"] = tree_to_json(&expr.children);
        return node;
    }

    node["keyword"] = Json::String(expr.keyword.clone());
    node["method"] = Json::String(expr.method_name.clone());
    if !expr.params.is_empty() {
        node["params"] = tokens_to_json(&expr.params);
    }
    if expr.operator != Operator::Unknown {
        node["operator"] = Json::String(expr.operator.to_string());
        node["value"] = Json::String(expr.value.clone());
        node["value_type"] = Json::String(expr.typed_value().type_name().to_string());
    }
    node
}

pub fn tree_to_json(expressions: &[Expression]) -> Json {
    Json::Array(expressions.iter().map(expression_to_json).collect())
}

pub fn to_json(value: &Json) -> String {
    value.to_string()
}

/// Pretty-printed with two-space indentation.
pub fn to_json_pretty(value: &Json) -> String {
    // Serializing a `serde_json::Value` cannot fail.
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub struct OutlinePrinter {
    indent_width: usize,
}

impl Default for OutlinePrinter {
    fn default() -> Self {
        OutlinePrinter { indent_width: 2 }
    }
}

impl OutlinePrinter {
    pub fn new(indent_width: usize) -> Self {
        OutlinePrinter { indent_width }
    }

    pub fn print(&self, expressions: &[Expression]) -> String {
        let mut out = String::new();
        self.print_list(expressions, 0, &mut out);
        out
    }

    fn print_list(&self, expressions: &[Expression], depth: usize, out: &mut String) {
        for expr in expressions {
            out.push_str(&" ".repeat(depth * self.indent_width));
            out.push_str(&format!("{:<3} ", expr.join.to_string()));
            if expr.negated {
                out.push_str("not ");
            }

            match expr.kind {
                ExpressionType::Group => {
                    out.push_str("(group)\n");
                    self.print_list(&expr.children, depth + 1, out);
                }
                _ => {
                    let mut clause = expr.clone();
                    clause.negated = false;
                    out.push_str(&clause.to_string());
                    out.push('\n');
                }
            }
        }
    }
}

/// Indented outline using the default printer.
pub fn outline(expressions: &[Expression]) -> String {
    OutlinePrinter::default().print(expressions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Join;

    #[test]
    fn test_method_clause_json() {
        let mut expr = Expression::new(ExpressionType::Method, "ItemCount");
        expr.method_name = "ItemCount".into();
        expr.params = vec!["1234".into()];
        expr.operator = Operator::GreaterThanEqual;
        expr.value = "5".into();

        let json = expression_to_json(&expr);
        assert_eq!(json["kind"], "Method");
        assert_eq!(json["params"][0], "1234");
        assert_eq!(json["operator"], ">=");
        assert_eq!(json["value_type"], "integer");
    }

    #[test]
    fn test_outline_negated_group() {
        let mut inner = Expression::new(ExpressionType::BoolVariable, "IsDead");
        inner.method_name = "IsDead".into();
        let mut group = Expression::group();
        group.negated = true;
        group.join = Join::Or;
        group.children = vec![inner];

        assert_eq!(outline(&[group]), "or  not (group)\n  and IsDead\n");
    }

    #[test]
    fn test_outline_custom_indent() {
        let mut inner = Expression::group();
        inner.children = vec![Expression::new(ExpressionType::Boolean, "true")];
        let mut outer = Expression::group();
        outer.children = vec![inner];

        let text = OutlinePrinter::new(4).print(&[outer]);
        assert_eq!(text, "and (group)\n    and (group)\n        and true\n");
    }
}
