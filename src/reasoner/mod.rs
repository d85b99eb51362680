//! Matching and rule firing
//!
//! - [`unify`]: directional pattern matching of statements
//! - [`chain`]: one forward-chaining step over a fact and a rule

pub mod chain;
pub mod unify;

pub use chain::ForwardChainer;
pub use unify::{unify_statements, PatternUnifier};
