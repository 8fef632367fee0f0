#![cfg(feature = "cli")]

use clause_lang::cli::{self, CheckOptions, CliError, InspectFormat};
use clause_lang::output::{outline, tree_to_json};
use clause_lang::registry::PredicateRegistry;
use clause_lang::{ConditionEngine, FactSheet, Value, conditions};
use pretty_assertions::assert_eq;
use serde_json::json;

fn check(condition: &str, facts: Option<&str>) -> Result<bool, CliError> {
    let options = CheckOptions {
        condition: condition.to_string(),
        facts: facts.map(str::to_string),
    };
    cli::execute_check(&options).map(|result| result.satisfied)
}

#[test]
fn test_check_against_facts() {
    let facts = r#"{"level": 72, "quests": [1234], "in_town": false}"#;

    assert!(check("Fact(level) >= 60 and Contains(quests, 1234)", Some(facts)).unwrap());
    assert!(check("not IsSet(in_town) or Fact(level) < 10", Some(facts)).unwrap());
    assert!(!check("Facts.level > 80", Some(facts)).unwrap());
}

#[test]
fn test_check_without_facts() {
    assert!(check("true and not false", None).unwrap());
    assert!(!check("HasFact(level)", None).unwrap());
    assert!(check("true", Some("   ")).unwrap());
}

#[test]
fn test_check_reports_parsed_tree() {
    let options = CheckOptions {
        condition: "(Fact(a) == 1 or true) and Unknown".to_string(),
        facts: None,
    };
    let result = cli::execute_check(&options).unwrap();

    assert!(result.satisfied);
    assert_eq!(result.clauses, 1);
    assert_eq!(result.tree[0]["kind"], "Group");
    assert_eq!(result.tree[0]["children"][0]["params"], json!(["a"]));
}

#[test]
fn test_check_errors() {
    assert!(matches!(check("  ", None), Err(CliError::EmptyCondition)));
    assert!(matches!(check("true", Some("[1]")), Err(CliError::Facts(_))));
    assert!(matches!(check("true", Some("{oops")), Err(CliError::Facts(_))));
}

#[test]
fn test_render_tokens_json() {
    let rendered = cli::render_tokens("A && (B)", InspectFormat::Json);
    let tokens: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(tokens, json!(["A", "&&", "(", "B", ")"]));
}

#[test]
fn test_render_tree_outline() {
    let engine = ConditionEngine::new(PredicateRegistry::builder().with(&FactSheet::new()).build());
    let rendered = cli::render_tree(
        &engine,
        "HasFact(a) or not (Fact(b) > 2 and true)",
        InspectFormat::Text,
    );

    assert_eq!(
        rendered,
        "and HasFact(a)\nor  not (group)\n  and Fact(b) > 2\n  and true\n"
    );
}

#[test]
fn test_docs_topics() {
    assert!(cli::get_docs_overview().contains("DOCUMENTATION TOPICS"));
    assert!(cli::get_doc_topic("Operators").unwrap().contains("COMPARATORS"));
    assert!(matches!(cli::get_doc_topic("queries"), Err(CliError::UnknownTopic(_))));
}

// ============================================================================
// End to end with host predicates
// ============================================================================

#[test]
fn test_host_predicates_and_facts_together() {
    let facts = FactSheet::new();
    facts.set("zone", "Harbor");
    let registry = PredicateRegistry::builder()
        .variable("Level", |expr| conditions::compare_value(expr, &Value::Int(64)))
        .bool_method("ActorFound", |expr| Ok(expr.param(0) == Some("5552")))
        .with(&facts)
        .build();
    let engine = ConditionEngine::new(registry);

    let condition = "Fact(zone) == harbor and (Level >= 60 or ActorFound(5552))";
    assert!(engine.check(condition));

    let tree = engine.parse(condition);
    assert_eq!(
        outline(&tree),
        "and Fact(zone) == harbor\nand (group)\n  and Level >= 60\n  or  ActorFound(5552)\n"
    );
    assert_eq!(tree_to_json(&tree)[1]["children"][0]["value_type"], "integer");
}
