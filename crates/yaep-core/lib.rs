//! `yaep_core` — an Earley parser engine.
//!
//! Given a (possibly ambiguous) context-free grammar and a token stream, this
//! crate recognizes the stream against the grammar and builds either a single
//! abstract translation tree, a cost-minimal tree, or a shared packed forest
//! representing every derivation.
//!
//! The engine is organized, leaves-first, as:
//!
//! - [`types`] — symbols, rules, translation specs, configuration, errors.
//! - [`grammar`] — the symbol/rule store, fixed-point analyses, and the
//!   [`grammar::Grammar`] construction API.
//! - [`compile`] — items (situations), cores, sets, the transition cache and
//!   Leo's right-recursion optimization.
//! - [`recognize`] — the recognizer main loop and minimal-cost error
//!   recovery.
//! - [`translate`] — abstract translation tree / shared packed forest
//!   construction from a completed parse list.

#![allow(non_snake_case)]

pub mod types;

pub mod grammar;

pub mod compile;

pub mod recognize;

pub mod translate;

pub use grammar::{Grammar, GrammarBuilder};
pub use recognize::{Parser, SyntaxErrorInfo, TokenAttr};
pub use translate::{build as translate, Forest, NodeId, TranslationNode, TranslationOutcome};
pub use types::{
  config::GrammarConfig,
  error::{ErrorCode, YaepError},
  rule::{Rule, RuleId, Translation},
  symbol::{Symbol, SymbolId, SymbolKind},
};

/// Convenience alias matching the crate's `Result<T, YaepError>` surface.
pub type Result<T> = std::result::Result<T, YaepError>;
