//! End-to-end behaviour of the knowledge base through the public API

use chainkb::{
    explain_answer, parse_input, parse_statement, Assertion, ErrorCode, ItemId, KnowledgeBase,
    ReasoningConfig, Retraction, Statement,
};

const GRANDPARENT_RULE: &str = "rule: ((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z)";

fn input(text: &str) -> Assertion {
    parse_input(text).unwrap()
}

fn stmt(text: &str) -> Statement {
    parse_statement(text).unwrap()
}

fn answers(kb: &KnowledgeBase, query: &str) -> Vec<String> {
    kb.ask(&input(query)).unwrap().iter().map(|a| a.to_string()).collect()
}

fn load(entries: &[&str]) -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();
    for entry in entries {
        kb.assert(input(entry));
    }
    kb
}

#[test]
fn grandparent_scenario() {
    let mut kb = load(&[
        "fact: (parent A B)",
        "fact: (parent B C)",
        "fact: (parent A D)",
        GRANDPARENT_RULE,
    ]);

    assert_eq!(answers(&kb, "fact: (grandparent A ?X)"), vec!["?X : C"]);

    let removed = kb.retract(&input("fact: (parent B C)"));
    assert!(removed.removed_count() >= 2);
    assert!(answers(&kb, "fact: (grandparent A ?X)").is_empty());
    kb.verify_integrity().unwrap();
}

#[test]
fn retract_keeps_fact_with_second_derivation() {
    let mut kb = load(&[
        "fact: (parent A B)",
        "fact: (parent B C)",
        "fact: (parent A D)",
        "fact: (parent D C)",
        GRANDPARENT_RULE,
    ]);
    let gp = kb.find_fact(&stmt("(grandparent A C)")).unwrap();
    assert_eq!(gp.supported_by().len(), 2);

    kb.retract(&input("fact: (parent B C)"));
    assert_eq!(answers(&kb, "fact: (grandparent A ?X)"), vec!["?X : C"]);
    kb.verify_integrity().unwrap();

    kb.retract(&input("fact: (parent A D)"));
    assert!(answers(&kb, "fact: (grandparent A ?X)").is_empty());
    kb.verify_integrity().unwrap();
}

#[test]
fn support_accumulates_in_any_arrival_order() {
    let facts = [
        "fact: (parent A B)",
        "fact: (parent B C)",
        "fact: (parent A D)",
        "fact: (parent D C)",
    ];

    let mut rule_last: Vec<&str> = facts.to_vec();
    rule_last.push(GRANDPARENT_RULE);
    let mut rule_first = vec![GRANDPARENT_RULE];
    rule_first.extend_from_slice(&facts);

    for order in [rule_last, rule_first] {
        let kb = load(&order);
        let gp = kb.find_fact(&stmt("(grandparent A C)")).unwrap();
        assert_eq!(gp.supported_by().len(), 2, "order: {:?}", order);
        assert_eq!(kb.fact_count(), 5);
        kb.verify_integrity().unwrap();
    }
}

#[test]
fn multi_level_cascade() {
    let mut kb = load(&[
        "rule: ((parent ?x ?y)) -> (ancestor ?x ?y)",
        "rule: ((ancestor ?x ?y) (parent ?y ?z)) -> (ancestor ?x ?z)",
        "fact: (parent P0 P1)",
        "fact: (parent P1 P2)",
        "fact: (parent P2 P3)",
    ]);
    assert_eq!(answers(&kb, "fact: (ancestor ?a ?b)").len(), 6);

    kb.retract(&input("fact: (parent P0 P1)"));

    assert!(answers(&kb, "fact: (ancestor P0 ?who)").is_empty());
    let remaining = answers(&kb, "fact: (ancestor ?a ?b)");
    assert_eq!(
        remaining,
        vec!["?a : P1, ?b : P2", "?a : P2, ?b : P3", "?a : P1, ?b : P3"]
    );
    kb.verify_integrity().unwrap();
}

#[test]
fn asserted_dependent_survives_and_stays_asserted() {
    let mut kb = load(&[
        "fact: (parent A B)",
        "fact: (parent B C)",
        GRANDPARENT_RULE,
        "fact: (grandparent A C)",
    ]);

    kb.retract(&input("fact: (parent A B)"));
    let gp = kb.find_fact(&stmt("(grandparent A C)")).unwrap();
    assert!(gp.is_asserted());
    assert!(gp.supported_by().is_empty());

    assert!(matches!(
        kb.retract(&input("fact: (grandparent A C)")),
        Retraction::Removed { .. }
    ));
    assert!(!kb.contains_fact(&stmt("(grandparent A C)")));
    kb.verify_integrity().unwrap();
}

#[test]
fn unasserted_fact_goes_with_its_support() {
    let mut kb = load(&[
        "fact: (parent A B)",
        "fact: (parent B C)",
        GRANDPARENT_RULE,
        "fact: (grandparent A C)",
    ]);

    assert_eq!(kb.retract(&input("fact: (grandparent A C)")), Retraction::Unasserted);
    assert_eq!(answers(&kb, "fact: (grandparent A ?X)"), vec!["?X : C"]);

    kb.retract(&input("fact: (parent B C)"));
    assert!(!kb.contains_fact(&stmt("(grandparent A C)")));
    kb.verify_integrity().unwrap();
}

#[test]
fn asserted_specialized_rule_survives() {
    let mut kb = load(&["fact: (parent A B)", "fact: (parent B C)", GRANDPARENT_RULE]);
    kb.assert(input("rule: ((parent B ?z)) -> (grandparent A ?z)"));

    kb.retract(&input("fact: (parent A B)"));
    assert_eq!(answers(&kb, "fact: (grandparent A ?X)"), vec!["?X : C"]);
    kb.verify_integrity().unwrap();
}

#[test]
fn reassert_changes_nothing() {
    let mut kb = load(&["fact: (parent A B)", "fact: (parent B C)", GRANDPARENT_RULE]);
    let (facts, rules) = (kb.fact_count(), kb.rule_count());
    let fires = kb.stats().fires;

    kb.assert(input("fact: (parent A B)"));
    kb.assert(input(GRANDPARENT_RULE));

    assert_eq!((kb.fact_count(), kb.rule_count()), (facts, rules));
    assert_eq!(kb.stats().fires, fires);
    assert_eq!(kb.stats().merges, 2);
}

#[test]
fn queries_only_see_facts() {
    let kb = load(&["rule: ((p ?x)) -> (q ?x)", "fact: (q A)"]);
    assert_eq!(answers(&kb, "fact: (q ?x)"), vec!["?x : A"]);
    assert_eq!(answers(&kb, "fact: (q A)"), vec![""]);
    assert!(answers(&kb, "fact: (p ?x)").is_empty());
}

#[test]
fn malformed_queries_are_errors() {
    let kb = load(&["fact: (p A)"]);

    let err = kb.ask(&input("rule: ((p ?x)) -> (q ?x)")).unwrap_err();
    assert_eq!(err.code, ErrorCode::RuleQuery);

    let err = kb.ask_statement(&Statement::new("?p", vec![])).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnresolvablePredicate);
    assert!(err.is_invalid_query());
}

#[test]
fn repeated_variable_must_match_consistently() {
    let kb = load(&[
        "rule: ((same ?x ?x)) -> (reflexive ?x)",
        "fact: (same A B)",
        "fact: (same C C)",
    ]);
    assert_eq!(answers(&kb, "fact: (reflexive ?x)"), vec!["?x : C"]);
}

#[test]
fn ids_are_not_reused() {
    let mut kb = load(&["fact: (p A)"]);
    let ItemId::Fact(first) = kb.assert(input("fact: (p A)")) else {
        panic!("expected a fact id");
    };

    kb.retract(&input("fact: (p A)"));
    assert!(kb.fact(first).is_none());

    let ItemId::Fact(second) = kb.assert(input("fact: (p A)")) else {
        panic!("expected a fact id");
    };
    assert!(second > first);
}

#[test]
fn derivations_of_asserted_items_are_not_recorded_by_default() {
    let mut kb = load(&[
        "fact: (parent A B)",
        "fact: (parent B C)",
        "fact: (grandparent A C)",
        GRANDPARENT_RULE,
    ]);

    assert!(kb.find_fact(&stmt("(grandparent A C)")).unwrap().supported_by().is_empty());
    assert!(matches!(
        kb.retract(&input("fact: (grandparent A C)")),
        Retraction::Removed { .. }
    ));
    kb.verify_integrity().unwrap();
}

#[test]
fn merge_policy_can_record_derivations_of_asserted_items() {
    let config = ReasoningConfig {
        record_support_on_asserted: true,
        ..ReasoningConfig::default()
    };
    let mut kb = KnowledgeBase::with_config(config);
    for entry in ["fact: (parent A B)", "fact: (parent B C)", "fact: (grandparent A C)", GRANDPARENT_RULE] {
        kb.assert(input(entry));
    }

    assert_eq!(kb.find_fact(&stmt("(grandparent A C)")).unwrap().supported_by().len(), 1);
    assert_eq!(kb.retract(&input("fact: (grandparent A C)")), Retraction::Unasserted);
    kb.verify_integrity().unwrap();
}

#[test]
fn retracting_root_of_mutual_recursion_removes_everything() {
    let mut kb = load(&[
        "rule: ((p ?x)) -> (q ?x)",
        "rule: ((q ?x)) -> (p ?x)",
        "fact: (p A)",
    ]);

    let removed = kb.retract(&input("fact: (p A)"));
    assert_eq!(
        removed,
        Retraction::Removed {
            facts: vec![stmt("(p A)"), stmt("(q A)")],
            rules: vec![],
        }
    );
    assert!(answers(&kb, "fact: (p ?x)").is_empty());
    assert!(answers(&kb, "fact: (q ?x)").is_empty());
    kb.verify_integrity().unwrap();
}

#[test]
fn load_str_is_all_or_nothing() {
    let mut kb = KnowledgeBase::new();
    let err = kb
        .load_str("fact: (parent A B)\nquery: (parent ?x B)\n")
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::UnknownEntryKind);
    assert!(kb.is_empty());

    let count = kb
        .load_str("; family\nfact: (parent A B)\nfact: (parent B C)\n")
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn explanation_reaches_asserted_leaves() {
    let kb = load(&["fact: (parent A B)", "fact: (parent B C)", GRANDPARENT_RULE]);
    let answers = kb.ask(&input("fact: (grandparent A ?X)")).unwrap();
    let text = explain_answer(&kb, &answers[0]).to_text();

    assert!(text.contains("(parent A B) [asserted]"));
    assert!(text.contains("(parent B C) [asserted]"));
    assert!(text.contains("option 1:"));
}

#[test]
fn integrity_holds_through_mixed_operations() {
    let mut kb = KnowledgeBase::new();
    let script = [
        "fact: (edge a b)",
        "fact: (edge b c)",
        "rule: ((edge ?x ?y)) -> (path ?x ?y)",
        "rule: ((path ?x ?y) (edge ?y ?z)) -> (path ?x ?z)",
        "fact: (edge c d)",
        "fact: (path a d)",
    ];
    for entry in script {
        kb.assert(input(entry));
        kb.verify_integrity().unwrap();
    }

    for target in ["fact: (edge b c)", "fact: (path a d)", "fact: (edge a b)"] {
        kb.retract(&input(target));
        kb.verify_integrity().unwrap();
    }

    assert_eq!(answers(&kb, "fact: (path ?x ?y)"), vec!["?x : c, ?y : d"]);
}
