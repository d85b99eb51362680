//! Core trait abstractions for chainkb
//!
//! The knowledge base owns storage and the justification graph. Matching and
//! rule firing sit behind the traits below so either can be swapped without
//! touching the mutation protocol.

use crate::kb::{Assertion, Fact, Rule, Support};
use crate::term::{Binding, Statement};

// ============================================================================
// Unification
// ============================================================================

/// Directional matching of a pattern statement against a target statement
///
/// The pattern side (a query or a rule antecedent) supplies the variables to
/// bind; the target side (usually a stored fact) supplies ground values.
/// A mismatch is a normal `None`, never an error.
pub trait Unifier: Send + Sync {
    /// Attempt to match two statements, producing a fresh binding
    fn unify(&self, pattern: &Statement, target: &Statement) -> Option<Binding>;

    /// Check whether two statements match without keeping the binding
    fn matches(&self, pattern: &Statement, target: &Statement) -> bool {
        self.unify(pattern, target).is_some()
    }
}

// ============================================================================
// Inference Engine Abstraction
// ============================================================================

/// The product of one successful rule firing
///
/// The engine never touches knowledge base storage; it hands back the new
/// item together with the `(fact, rule)` pair that justifies it, and the
/// knowledge base performs the add-or-merge and back-reference bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Derivation {
    /// The derived fact or partially specialized rule
    pub assertion: Assertion,
    /// The justification for it
    pub support: Support,
    /// The binding produced by matching the first antecedent
    pub binding: Binding,
}

/// A forward inference strategy
pub trait InferenceEngine: Send + Sync {
    /// Name of this inference strategy
    fn name(&self) -> &str;

    /// Try to fire `rule` using `fact` as evidence for its first antecedent
    ///
    /// Produces at most one derivation and never recurses; closure is the
    /// caller's job.
    fn fire(&self, fact: &Fact, rule: &Rule) -> Option<Derivation>;
}
