// tests/facts_tests.rs

use clause_lang::facts::{FactError, FactSheet, scalar};
use clause_lang::registry::PredicateRegistry;
use clause_lang::{ConditionEngine, Value};
use serde_json::json;

fn engine(facts: &FactSheet) -> ConditionEngine {
    ConditionEngine::new(PredicateRegistry::builder().with(facts).build())
}

fn sample() -> FactSheet {
    FactSheet::from_json(json!({
        "level": 72,
        "speed": 7.25,
        "zone": "Stormwind Harbor",
        "in_town": false,
        "target": "Elite Bandit",
        "quests": [1234, 5552],
        "buffs": {"Fortitude": 30},
        "empty": "",
    }))
    .unwrap()
}

// ============================================================================
// Sheet
// ============================================================================

#[test]
fn test_from_json_requires_object() {
    assert!(matches!(
        FactSheet::from_json(json!([1, 2])),
        Err(FactError::NotAnObject("array"))
    ));
    assert!(matches!(
        FactSheet::from_json_str("{not json"),
        Err(FactError::Json(_))
    ));
}

#[test]
fn test_lookup_prefers_exact_name() {
    let facts = FactSheet::new();
    facts.set("Mode", "upper");
    facts.set("mode", "lower");

    assert_eq!(facts.get("mode"), Some(json!("lower")));
    assert_eq!(facts.get("MODE"), Some(json!("upper")));
    assert_eq!(facts.len(), 2);
}

#[test]
fn test_clones_share_the_table() {
    let facts = FactSheet::new();
    let view = facts.clone();
    facts.set("hp", 10);

    assert!(view.contains("hp"));
    assert_eq!(view.remove("hp"), Some(json!(10)));
    assert!(facts.is_empty());
}

#[test]
fn test_scalar_conversion() {
    assert_eq!(scalar(&json!(3)), Some(Value::Int(3)));
    assert_eq!(scalar(&json!(2.5)), Some(Value::Float(2.5)));
    assert_eq!(scalar(&json!("x")), Some(Value::Str("x".into())));
    assert_eq!(scalar(&json!(true)), Some(Value::Bool(true)));
    assert_eq!(scalar(&json!(null)), None);
    assert_eq!(scalar(&json!([1])), None);
}

// ============================================================================
// Predicates
// ============================================================================

#[test]
fn test_fact_comparisons() {
    let engine = engine(&sample());

    assert!(engine.check("Fact(level) >= 60"));
    assert!(engine.check("Fact(speed) > 7.2 and Fact(speed) < 7.3"));
    assert!(engine.check("Fact(zone) == 'stormwind harbor'"));
    assert!(engine.check("Fact(in_town) == false"));
    assert!(!engine.check("Fact(level) < 10"));
}

#[test]
fn test_missing_or_non_scalar_fact_is_false() {
    let engine = engine(&sample());

    assert!(!engine.check("Fact(mana) > 0"));
    assert!(!engine.check("Fact(quests) == 1234"));
}

#[test]
fn test_presence_and_truthiness() {
    let engine = engine(&sample());

    assert!(engine.check("HasFact(in_town)"));
    assert!(!engine.check("IsSet(in_town)"));
    assert!(!engine.check("IsSet(empty)"));
    assert!(engine.check("IsSet(quests) and not HasFact(mana)"));
}

#[test]
fn test_matches() {
    let engine = engine(&sample());

    assert!(engine.check("Matches(target, '^Elite ')"));
    assert!(!engine.check("Matches(target, '^Rare')"));
    assert!(!engine.check("Matches(target, '[unclosed')"));
}

#[test]
fn test_contains() {
    let engine = engine(&sample());

    assert!(engine.check("Contains(quests, 5552)"));
    assert!(!engine.check("Contains(quests, 1)"));
    assert!(engine.check("Contains(buffs, fortitude)"));
    assert!(engine.check("Contains(zone, harbor)"));
    assert!(!engine.check("Contains(level, 7)"));
}

#[test]
fn test_namespace_access() {
    let engine = engine(&sample());

    assert!(engine.check("Facts.level > 70"));
    assert!(engine.check("Facts.zone != Ironforge"));
    assert!(engine.check("not Facts.in_town"));
    assert!(!engine.check("Facts.missing"));
}

#[test]
fn test_removed_fact_stops_matching() {
    let facts = sample();
    let engine = engine(&facts);
    assert!(engine.check("HasFact(target)"));

    assert_eq!(facts.remove("target"), Some(json!("Elite Bandit")));
    assert_eq!(facts.remove("target"), None);
    assert!(!engine.check("HasFact(target)"));
}

#[test]
fn test_facts_are_read_at_evaluation_time() {
    let facts = FactSheet::new();
    let engine = engine(&facts);
    let condition = engine.compile("Fact(gold) >= 100");

    facts.set("gold", 20);
    assert!(!condition.evaluate(&engine));
    facts.set("gold", 150);
    assert!(condition.evaluate(&engine));
}
