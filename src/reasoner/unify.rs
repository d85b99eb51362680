//! Directional matching of flat statements
//!
//! Statements are a predicate applied to constants and variables, so there
//! is no nesting and no occurs check. Matching walks the two term lists left
//! to right, accumulating one binding shared by both sides.

use crate::core::Unifier;
use crate::term::{Binding, Statement, Term};

/// The default [`Unifier`]
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternUnifier;

impl PatternUnifier {
    pub fn new() -> Self {
        PatternUnifier
    }
}

impl Unifier for PatternUnifier {
    fn unify(&self, pattern: &Statement, target: &Statement) -> Option<Binding> {
        unify_statements(pattern, target)
    }
}

/// Match `pattern` against `target`
///
/// Fails on a predicate or arity mismatch. Per term pair:
/// - constant vs constant must be identical
/// - a variable on either side binds to the constant opposite it, and must
///   agree with any earlier binding of the same variable
/// - variable vs variable succeeds only if one of them is already bound, in
///   which case the other is bound to that constant
pub fn unify_statements(pattern: &Statement, target: &Statement) -> Option<Binding> {
    if pattern.predicate() != target.predicate() || pattern.arity() != target.arity() {
        return None;
    }

    let mut binding = Binding::new();
    for (p, t) in pattern.terms().iter().zip(target.terms()) {
        if !unify_terms(p, t, &mut binding) {
            return None;
        }
    }

    Some(binding)
}

fn unify_terms(pattern: &Term, target: &Term, binding: &mut Binding) -> bool {
    match (pattern, target) {
        (Term::Constant(a), Term::Constant(b)) => a == b,
        (Term::Variable(var), Term::Constant(value))
        | (Term::Constant(value), Term::Variable(var)) => binding.test_and_bind(var, value),
        (Term::Variable(a), Term::Variable(b)) => {
            match (binding.get(a).cloned(), binding.get(b).cloned()) {
                (Some(value), _) => binding.test_and_bind(b, &value),
                (None, Some(value)) => binding.test_and_bind(a, &value),
                (None, None) => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Constant;

    fn st(pred: &str, tokens: &[&str]) -> Statement {
        Statement::from_tokens(pred, tokens.iter().copied())
    }

    #[test]
    fn test_ground_match() {
        let b = unify_statements(&st("parent", &["A", "B"]), &st("parent", &["A", "B"]));
        assert!(b.map(|b| b.is_empty()).unwrap_or(false));
    }

    #[test]
    fn test_predicate_and_arity_mismatch() {
        assert!(unify_statements(&st("parent", &["?x", "B"]), &st("child", &["A", "B"])).is_none());
        assert!(unify_statements(&st("parent", &["?x"]), &st("parent", &["A", "B"])).is_none());
    }

    #[test]
    fn test_variable_binds_constant() {
        let b = unify_statements(&st("grandparent", &["A", "?X"]), &st("grandparent", &["A", "C"]))
            .expect("should match");
        assert_eq!(b.to_string(), "?X : C");
    }

    #[test]
    fn test_repeated_variable_must_agree() {
        let pattern = st("likes", &["?x", "?x"]);
        assert!(unify_statements(&pattern, &st("likes", &["A", "A"])).is_some());
        assert!(unify_statements(&pattern, &st("likes", &["A", "B"])).is_none());
    }

    #[test]
    fn test_constant_against_target_variable() {
        let b = unify_statements(&st("p", &["A"]), &st("p", &["?y"])).expect("should match");
        assert_eq!(b.get_by_name("y"), Some(&Constant::new("A")));
    }

    #[test]
    fn test_unbound_variable_pair_fails() {
        assert!(unify_statements(&st("p", &["?x"]), &st("p", &["?y"])).is_none());
    }

    #[test]
    fn test_variable_pair_resolves_through_earlier_binding() {
        let b = unify_statements(&st("p", &["?x", "?x"]), &st("p", &["A", "?y"]))
            .expect("should match");
        assert_eq!(b.get_by_name("y"), Some(&Constant::new("A")));
    }

    #[test]
    fn test_trait_object() {
        let unifier: &dyn Unifier = &PatternUnifier::new();
        assert!(unifier.matches(&st("p", &["?x"]), &st("p", &["A"])));
    }
}
