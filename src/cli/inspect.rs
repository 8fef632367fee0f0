//! Token and tree dumps for debugging conditions

use crate::{ConditionEngine, lexer, output};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InspectFormat {
    #[default]
    Text,
    Json,
}

/// One token per line, or a JSON array.
pub fn render_tokens(condition: &str, format: InspectFormat) -> String {
    let tokens = lexer::tokenize(condition);
    match format {
        InspectFormat::Json => output::to_json_pretty(&output::tokens_to_json(&tokens)),
        InspectFormat::Text => tokens
            .iter()
            .enumerate()
            .map(|(i, token)| format!("{i:>3}  {token}\n"))
            .collect(),
    }
}

/// The tree as parsed by `engine`, so host predicates are recognised.
pub fn render_tree(engine: &ConditionEngine, condition: &str, format: InspectFormat) -> String {
    let expressions = engine.parse(condition);
    match format {
        InspectFormat::Json => output::to_json_pretty(&output::tree_to_json(&expressions)),
        InspectFormat::Text => output::outline(&expressions),
    }
}
