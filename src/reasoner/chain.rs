//! Forward chaining over one fact and one rule
//!
//! A rule `a ∧ b ∧ c → d` fired with a fact matching `a` yields either the
//! conclusion (single antecedent) or the specialized rule `b' ∧ c' → d'`
//! carrying the remaining antecedents as obligations. Closure over the whole
//! knowledge base is driven by [`crate::kb::KnowledgeBase`].

use crate::core::{Derivation, InferenceEngine, Unifier};
use crate::kb::{Assertion, Fact, Implication, Rule, Support};
use crate::term::instantiate;

use super::unify::PatternUnifier;

/// The default [`InferenceEngine`]
#[derive(Clone, Debug, Default)]
pub struct ForwardChainer<U = PatternUnifier> {
    unifier: U,
}

impl ForwardChainer {
    pub fn new() -> Self {
        ForwardChainer { unifier: PatternUnifier }
    }
}

impl<U: Unifier> ForwardChainer<U> {
    /// Chain with a custom matching strategy
    pub fn with_unifier(unifier: U) -> Self {
        ForwardChainer { unifier }
    }
}

impl<U: Unifier> InferenceEngine for ForwardChainer<U> {
    fn name(&self) -> &str {
        "forward"
    }

    fn fire(&self, fact: &Fact, rule: &Rule) -> Option<Derivation> {
        let (first, rest) = rule.lhs().split_first()?;
        let binding = self.unifier.unify(first, fact.statement())?;

        let rhs = instantiate(rule.rhs(), &binding);
        let assertion = if rest.is_empty() {
            Assertion::Fact(rhs)
        } else {
            let lhs = rest.iter().map(|s| instantiate(s, &binding)).collect();
            Assertion::Rule(Implication::from_parts(lhs, rhs))
        };

        Some(Derivation {
            assertion,
            support: Support::new(fact.id(), rule.id()),
            binding,
        })
    }
}
