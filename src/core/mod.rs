//! Core abstractions for chainkb
//!
//! This module provides:
//! - `traits`: the seams between the knowledge base and its matching and
//!   inference strategies (`Unifier`, `InferenceEngine`)

pub mod traits;

pub use traits::*;
