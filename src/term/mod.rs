//! Statement and term representations
//!
//! This module defines the value types the knowledge base reasons over:
//! - Constants (opaque ground identifiers)
//! - Variables (bindable, written `?x`)
//! - Statements (a predicate applied to an ordered list of terms)
//! - Bindings (variable to constant assignments)

use std::fmt;
use std::sync::Arc;

mod binding;
mod constant;
mod variable;

pub use binding::Binding;
pub use constant::Constant;
pub use variable::Variable;

/// A term in a statement
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// A ground identifier
    Constant(Constant),
    /// A bindable variable
    Variable(Variable),
}

impl Term {
    /// Create a constant term
    pub fn constant(s: impl AsRef<str>) -> Self {
        Term::Constant(Constant::new(s))
    }

    /// Create a variable term (a leading `?` is accepted and stripped)
    pub fn variable(name: impl AsRef<str>) -> Self {
        Term::Variable(Variable::new(name))
    }

    /// Classify a raw token: `?name` is a variable, anything else a constant
    pub fn from_token(token: &str) -> Self {
        if token.starts_with('?') {
            Term::variable(token)
        } else {
            Term::constant(token)
        }
    }

    /// Check if this term is a variable
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Check if this term is ground
    pub fn is_ground(&self) -> bool {
        matches!(self, Term::Constant(_))
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Term::Constant(c) => Some(c),
            Term::Variable(_) => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(v) => Some(v),
            Term::Constant(_) => None,
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Constant(c) => write!(f, "{:?}", c),
            Term::Variable(v) => write!(f, "{:?}", v),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Constant(c) => write!(f, "{}", c),
            Term::Variable(v) => write!(f, "{}", v),
        }
    }
}

/// A flat statement: a predicate name applied to ordered terms
///
/// Equality and hashing are syntactic, so two statements are equal exactly
/// when they have the same predicate, the same arity and pairwise equal terms.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Statement {
    predicate: Arc<str>,
    terms: Vec<Term>,
}

impl Statement {
    pub fn new(predicate: impl AsRef<str>, terms: Vec<Term>) -> Self {
        Statement {
            predicate: Arc::from(predicate.as_ref()),
            terms,
        }
    }

    /// Build a statement from raw tokens, classifying each with [`Term::from_token`]
    pub fn from_tokens<'a>(predicate: &str, tokens: impl IntoIterator<Item = &'a str>) -> Self {
        Statement::new(predicate, tokens.into_iter().map(Term::from_token).collect())
    }

    pub fn predicate(&self) -> &str {
        &self.predicate
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    /// Check if this statement contains any variables
    pub fn has_variables(&self) -> bool {
        self.terms.iter().any(Term::is_variable)
    }

    /// Check if this statement is ground (no variables)
    pub fn is_ground(&self) -> bool {
        !self.has_variables()
    }

    /// Variables in order of first occurrence
    pub fn variables(&self) -> Vec<&Variable> {
        let mut vars: Vec<&Variable> = Vec::new();
        for v in self.terms.iter().filter_map(Term::as_variable) {
            if !vars.contains(&v) {
                vars.push(v);
            }
        }
        vars
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.predicate)?;
        for term in &self.terms {
            write!(f, " {}", term)?;
        }
        write!(f, ")")
    }
}

/// Apply a binding to a term, substituting a bound variable
pub fn substitute(term: &Term, binding: &Binding) -> Term {
    match term {
        Term::Variable(v) => binding
            .get(v)
            .map(|c| Term::Constant(c.clone()))
            .unwrap_or_else(|| term.clone()),
        Term::Constant(_) => term.clone(),
    }
}

/// Apply a binding to a statement
///
/// Variables absent from `binding` are left in place, which is what lets a
/// multi-antecedent rule be specialized one antecedent at a time.
pub fn instantiate(statement: &Statement, binding: &Binding) -> Statement {
    Statement {
        predicate: statement.predicate.clone(),
        terms: statement.terms.iter().map(|t| substitute(t, binding)).collect(),
    }
}
