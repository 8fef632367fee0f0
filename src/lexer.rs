use tracing::trace;

use crate::ast::tokens::{is_operator_char, is_operator_prefix};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    Operator,
}

/// Splits a condition string into a flat stream of string tokens.
///
/// Whitespace and commas separate tokens and are discarded. Runs of
/// operator characters are grown greedily while the run is still a prefix
/// of some operator, so `>=` lexes as one token while `>>` lexes as two.
/// Quoted runs (`'...'` or `"..."`) become a single token without their
/// quotes. Nothing here is ever an error: characters the lexer does not know
/// are ordinary text.
///
/// The lexer is a single forward pass and yields tokens lazily through
/// [`Iterator`].
///
/// # Examples
///
/// ```
/// use clause_lang::Lexer;
///
/// let tokens: Vec<String> = Lexer::new("Level>=60 and not IsDead").collect();
/// assert_eq!(tokens, ["Level", ">=", "60", "and", "not", "IsDead"]);
/// ```
pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn is_separator(ch: char) -> bool {
        ch.is_whitespace() || ch == ','
    }

    fn is_quote(ch: char) -> bool {
        ch == '\'' || ch == '"'
    }

    fn is_line_ending(ch: char) -> bool {
        matches!(ch, '\r' | '\n' | '\u{2028}' | '\u{2029}')
    }

    /// Read up to the closing `quote` (or end of input). The opening quote
    /// must already be consumed.
    fn read_quoted(&mut self, quote: char) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == quote {
                break;
            }
            result.push(ch);
        }
        result
    }

    fn finish(buffer: String) -> String {
        buffer.chars().filter(|c| !Self::is_line_ending(*c)).collect()
    }

    /// Produce the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Option<String> {
        let mut buffer = String::new();
        let mut mode = Mode::Text;

        while let Some(ch) = self.current_char() {
            if Self::is_quote(ch) {
                if !buffer.is_empty() {
                    break;
                }
                self.advance();
                let literal = Self::finish(self.read_quoted(ch));
                if literal.is_empty() {
                    continue;
                }
                trace!(token = %literal, position = self.position, "lexed quoted token");
                return Some(literal);
            }

            if Self::is_separator(ch) {
                self.advance();
                if buffer.is_empty() {
                    continue;
                }
                break;
            }

            if is_operator_char(ch) {
                if buffer.is_empty() {
                    mode = Mode::Operator;
                } else if mode != Mode::Operator || !is_operator_prefix(&format!("{buffer}{ch}")) {
                    break;
                }
                buffer.push(ch);
                self.advance();
                continue;
            }

            if mode == Mode::Operator && !buffer.is_empty() {
                break;
            }
            mode = Mode::Text;
            buffer.push(ch);
            self.advance();
        }

        let token = Self::finish(buffer);
        if token.is_empty() {
            return None;
        }
        trace!(token = %token, position = self.position, "lexed token");
        Some(token)
    }
}

impl Iterator for Lexer {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Tokenize a whole condition string eagerly.
pub fn tokenize(input: &str) -> Vec<String> {
    Lexer::new(input).collect()
}

#[test]
fn test_operator_greediness() {
    assert_eq!(tokenize(">="), [">="]);
    assert_eq!(tokenize("a>b"), ["a", ">", "b"]);
    assert_eq!(tokenize(">>"), [">", ">"]);
}

#[test]
fn test_call_syntax() {
    assert_eq!(
        tokenize("HasQuest(1234, 5)"),
        ["HasQuest", "(", "1234", "5", ")"]
    );
    assert_eq!(tokenize("((A))"), ["(", "(", "A", ")", ")"]);
}
