use tracing::{debug, trace, warn};

use crate::{
    ast::{Expression, ExpressionType, Join, Operator, Symbol},
    conditions::GET_BOOLEAN,
    lexer::Lexer,
    registry::PredicateRegistry,
};

/// Outcome of building one clause: how many tokens it looked at, and the
/// clause itself or the reason it was dropped.
struct Built {
    consumed: usize,
    result: Result<Expression, String>,
}

/// Builds the expression tree of a condition string.
///
/// Parsing is lenient: a clause that does not fit its predicate's declared
/// shape, an unknown name, or a stray parenthesis is logged and skipped, and
/// the remaining clauses still parse. `parse` therefore never fails.
///
/// # Examples
///
/// ```
/// use clause_lang::{Parser, registry::PredicateRegistry};
///
/// let registry = PredicateRegistry::builder()
///     .bool_variable("IsInTown", |_| Ok(true))
///     .variable("Level", |_| Ok(true))
///     .build();
///
/// let tree = Parser::new("not IsInTown or (Level >= 60)", &registry).parse();
/// assert_eq!(tree.len(), 2);
/// assert!(tree[0].negated);
/// assert!(tree[1].is_group());
/// ```
pub struct Parser<'r> {
    registry: &'r PredicateRegistry,
    tokens: Vec<String>,
    position: usize,

    /// Join and negation read from the operator tokens directly preceding
    /// the next clause.
    pending_join: Option<Join>,
    pending_not: bool,

    /// Groups opened by `(` and not yet closed, innermost last.
    open_groups: Vec<Expression>,
    root: Vec<Expression>,
}

impl<'r> Parser<'r> {
    pub fn new(input: &str, registry: &'r PredicateRegistry) -> Self {
        Self::from_tokens(Lexer::new(input).collect(), registry)
    }

    pub fn from_tokens(tokens: Vec<String>, registry: &'r PredicateRegistry) -> Self {
        Parser {
            registry,
            tokens,
            position: 0,
            pending_join: None,
            pending_not: false,
            open_groups: Vec::new(),
            root: Vec::new(),
        }
    }

    fn current(&self) -> Option<&str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    fn token_at(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn clear_prefix(&mut self) {
        self.pending_join = None;
        self.pending_not = false;
    }

    fn apply_prefix(&mut self, expr: &mut Expression) {
        expr.join = self.pending_join.unwrap_or(Join::And);
        expr.negated = self.pending_not;
        self.clear_prefix();
    }

    fn push(&mut self, expr: Expression) {
        match self.open_groups.last_mut() {
            Some(group) => group.children.push(expr),
            None => self.root.push(expr),
        }
    }

    /// Parse the whole token stream into the root sibling list.
    pub fn parse(mut self) -> Vec<Expression> {
        while let Some(token) = self.current() {
            match Symbol::parse(token) {
                // `not` may sit on either side of the join: `and not B`, `not and B`
                Some(symbol @ (Symbol::And | Symbol::Or)) => {
                    self.pending_join = Join::from_symbol(symbol);
                    self.advance();
                }
                Some(Symbol::Not) => {
                    self.pending_not = true;
                    self.advance();
                }
                Some(Symbol::LParen) => {
                    let mut group = Expression::group();
                    self.apply_prefix(&mut group);
                    trace!(id = group.id, depth = self.open_groups.len(), "opened group");
                    self.open_groups.push(group);
                    self.advance();
                }
                Some(Symbol::RParen) => {
                    self.close_group();
                    self.clear_prefix();
                    self.advance();
                }
                Some(symbol) => {
                    debug!(%symbol, position = self.position, "operator without a clause, skipping");
                    self.clear_prefix();
                    self.advance();
                }
                None => self.parse_clause(),
            }
        }

        if !self.open_groups.is_empty() {
            warn!(
                unclosed = self.open_groups.len(),
                "condition ended with unclosed groups, dropping them"
            );
        }

        self.root
    }

    fn close_group(&mut self) {
        let Some(group) = self.open_groups.pop() else {
            warn!(position = self.position, "unbalanced closing parenthesis");
            return;
        };

        if group.children.is_empty() {
            debug!(id = group.id, "dropping empty group");
            return;
        }

        trace!(id = group.id, children = group.children.len(), "closed group");
        self.push(group);
    }

    fn parse_clause(&mut self) {
        let Some(token) = self.current().map(str::to_string) else {
            return;
        };

        let classified = if token.eq_ignore_ascii_case("true") || token.eq_ignore_ascii_case("false") {
            Some((ExpressionType::Boolean, GET_BOOLEAN.to_string()))
        } else {
            self.registry.classify(&token)
        };

        let Some((kind, method_name)) = classified else {
            debug!(%token, position = self.position, "Unrecognized token");
            self.clear_prefix();
            self.advance();
            return;
        };

        let built = self.build_clause(kind, &token, method_name);
        self.position += built.consumed;

        match built.result {
            Ok(mut expr) => {
                self.apply_prefix(&mut expr);
                trace!(id = expr.id, %kind, clause = %expr, "parsed clause");
                self.push(expr);
            }
            Err(reason) => {
                debug!(%token, %kind, %reason, "dropping malformed clause");
                self.clear_prefix();
            }
        }
    }

    fn build_clause(&self, kind: ExpressionType, keyword: &str, method_name: String) -> Built {
        let mut expr = Expression::new(kind, keyword);
        expr.method_name = method_name;
        let mut consumed = 1;

        if kind == ExpressionType::Boolean {
            expr.value = keyword.to_string();
            return Built {
                consumed,
                result: Ok(expr),
            };
        }

        let next = self.position + consumed;
        let wants_params = kind.requires_params()
            || (kind == ExpressionType::Namespace
                && self.token_at(next).and_then(Symbol::parse) == Some(Symbol::LParen));
        if wants_params {
            match self.read_params(next) {
                Ok((params, used)) => {
                    expr.params = params;
                    consumed += used;
                }
                Err(reason) => {
                    return Built {
                        consumed,
                        result: Err(reason),
                    };
                }
            }
        }

        let next = self.position + consumed;
        let wants_comparison = kind.requires_comparison()
            || (kind == ExpressionType::Namespace
                && self
                    .token_at(next)
                    .and_then(Symbol::parse)
                    .is_some_and(Symbol::is_comparator));
        if wants_comparison {
            match self.read_comparison(next) {
                Ok((operator, value)) => {
                    expr.operator = operator;
                    expr.value = value;
                    consumed += 2;
                }
                Err(reason) => {
                    return Built {
                        consumed,
                        result: Err(reason),
                    };
                }
            }
        }

        Built {
            consumed,
            result: Ok(expr),
        }
    }

    /// Read `( arg arg ... )` starting at `start`. Returns the arguments and
    /// the number of tokens used, parentheses included.
    fn read_params(&self, start: usize) -> Result<(Vec<String>, usize), String> {
        match self.token_at(start).and_then(Symbol::parse) {
            Some(Symbol::LParen) => {}
            _ => return Err("expected '(' after method name".to_string()),
        }

        let mut params = Vec::new();
        let mut index = start + 1;
        while let Some(token) = self.token_at(index) {
            match Symbol::parse(token) {
                Some(Symbol::RParen) => return Ok((params, index - start + 1)),
                Some(symbol) => {
                    return Err(format!("operator '{symbol}' is not allowed as an argument"));
                }
                None => params.push(token.to_string()),
            }
            index += 1;
        }

        Err("unterminated argument list".to_string())
    }

    /// Read `OP value` starting at `start`.
    fn read_comparison(&self, start: usize) -> Result<(Operator, String), String> {
        let operator = match self.token_at(start).and_then(Symbol::parse) {
            Some(symbol) if symbol.is_comparator() => Operator::from_symbol(symbol),
            _ => return Err("expected a comparison operator".to_string()),
        };

        let Some(value) = self.token_at(start + 1) else {
            return Err("expected a value after the operator".to_string());
        };
        if Symbol::parse(value).is_some() {
            return Err(format!("operator '{value}' is not a value"));
        }
        if self.registry.is_known(value) {
            return Err(format!("predicate name '{value}' is not a value"));
        }

        Ok((operator, value.to_string()))
    }
}

/// Parse `input` against `registry`.
pub fn parse(input: &str, registry: &PredicateRegistry) -> Vec<Expression> {
    Parser::new(input, registry).parse()
}
