//! `yaep_descr` — the YACC-like grammar description front-end (spec §6.2).
//!
//! `spec.md` treats this reader as an external collaborator, specified only
//! by the programmatic API it drives (`yaep_core::GrammarBuilder`). This
//! crate is that collaborator: a hand-written recursive-descent scanner and
//! parser, with no parser-generator dependency of its own (bootstrapping
//! concern), that turns a textual description into the same builder calls
//! an external caller would make by hand.

mod lexer;
mod reader;

pub use reader::read_grammar;
