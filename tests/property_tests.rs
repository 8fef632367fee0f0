use clause_lang::lexer::tokenize;
use clause_lang::registry::PredicateRegistry;
use clause_lang::{ConditionEngine, parser};
use proptest::prelude::*;

fn operator() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "&&", "||", "==", "!=", "<", "<=", ">", ">=", "(", ")", "and", "or", "not",
    ])
    .prop_map(str::to_string)
}

fn identifier() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_.]{0,8}"
}

fn piece() -> impl Strategy<Value = String> {
    prop_oneof![operator(), identifier()]
}

proptest! {
    #[test]
    fn retokenizing_joined_tokens_is_stable(pieces in prop::collection::vec(piece(), 0..24)) {
        let first = tokenize(&pieces.join(" "));
        let second = tokenize(&first.join(" "));
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first, pieces);
    }

    #[test]
    fn parsing_never_panics(input in "[ -~]{0,64}") {
        let registry = PredicateRegistry::builder()
            .bool_variable("A", |_| Ok(true))
            .variable("Level", |_| Ok(true))
            .method("Count", |_| Ok(true))
            .bool_method("Has", |_| Ok(false))
            .build();
        let tree = parser::parse(&input, &registry);
        let engine = ConditionEngine::new(registry);
        engine.evaluate(&tree);
    }

    #[test]
    fn negated_literal_flips(value in any::<bool>()) {
        let engine = ConditionEngine::default();
        prop_assert_eq!(engine.check(&format!("not {value}")), !value);
    }
}
