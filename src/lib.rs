//! chainkb - a symbolic knowledge base with forward chaining
//!
//! Facts and rules are stored in a [`KnowledgeBase`] that derives
//! consequences as soon as something is asserted and keeps a justification
//! graph so retraction removes exactly what no longer holds.
//!
//! # Architecture
//!
//! - [`term`] - constants, variables, statements and bindings
//! - [`core::Unifier`] - pattern matching used by queries and rule firing
//! - [`core::InferenceEngine`] - one fact/rule inference step
//! - [`kb`] - storage, closure, queries, truth-maintained retraction and explanations
//! - [`parser`] - the `fact:` / `rule:` text format
//! - [`config`] - TOML configuration with environment overrides
//!
//! # Example
//!
//! ```rust,ignore
//! use chainkb::{KnowledgeBase, parse_input};
//!
//! let mut kb = KnowledgeBase::new();
//! kb.assert(parse_input("fact: (parent A B)")?);
//! kb.assert(parse_input("fact: (parent B C)")?);
//! kb.assert(parse_input("rule: ((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z)")?);
//!
//! for answer in kb.ask(&parse_input("fact: (grandparent ?who C)")?)? {
//!     println!("{}", answer); // ?who : A
//! }
//! ```
//!
//! Logging goes through `tracing`; install any subscriber to see it.

pub mod core;
pub mod config;
pub mod error;
pub mod term;
pub mod parser;
pub mod reasoner;
pub mod kb;

// Re-export core traits
pub use crate::core::{Derivation, InferenceEngine, Unifier};

// Re-export term types
pub use term::{instantiate, substitute, Binding, Constant, Statement, Term, Variable};

// Re-export parser types
pub use parser::{parse_document, parse_input, parse_statement, ParseError};

// Re-export reasoner types
pub use reasoner::{unify_statements, ForwardChainer, PatternUnifier};

// Re-export knowledge base types
pub use kb::{
    explain_answer, explain_item, Answer, Assertion, Explanation, Fact, FactId, Implication, ItemId,
    KbStats, KnowledgeBase, Provenance, Retraction, Rule, RuleId, Support, SupportNode, SupportOption,
};

// Re-export configuration types
pub use config::{ConfigError, GeneralConfig, KbConfig, LogLevel, ReasoningConfig};

// Re-export error types
pub use error::{ErrorCode, ErrorContext, KbError, KbResult};
