//! The symbol table (spec §4.1): interned terminals and nonterminals, their
//! dense ids, and the per-symbol analysis flags set by [`crate::grammar::analyzer`].

use super::Array;
use crate::types::rule::RuleId;

/// A dense index into [`crate::grammar::Grammar`]'s symbol table. Stable for
/// the lifetime of the grammar; shared by both terminals and nonterminals so
/// that RHS/LHS positions can hold a single id type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl From<usize> for SymbolId {
  fn from(v: usize) -> Self {
    SymbolId(v as u32)
  }
}

/// Kind-specific symbol data.
#[derive(Debug, Clone)]
pub enum SymbolKind {
  Terminal {
    /// The user-supplied integer code used on the wire (token stream) to
    /// identify this terminal. Unique across all terminals in the grammar.
    code: i32,
  },
  Nonterminal {
    /// Ids of every rule with this nonterminal on the left-hand side.
    rules: Array<RuleId>,
    /// `true` iff some rule for this nonterminal has an all-nullable RHS.
    nullable: bool,
    /// `true` iff this nonterminal is reachable from the start symbol.
    accessible: bool,
    /// `true` iff this nonterminal can derive some string of terminals.
    productive: bool,
  },
}

/// One entry of the symbol table.
#[derive(Debug, Clone)]
pub struct Symbol {
  pub id: SymbolId,
  pub name: String,
  pub kind: SymbolKind,
}

impl Symbol {
  pub fn is_terminal(&self) -> bool {
    matches!(self.kind, SymbolKind::Terminal { .. })
  }

  pub fn is_nonterminal(&self) -> bool {
    matches!(self.kind, SymbolKind::Nonterminal { .. })
  }

  pub fn terminal_code(&self) -> Option<i32> {
    match self.kind {
      SymbolKind::Terminal { code } => Some(code),
      _ => None,
    }
  }

  pub fn nullable(&self) -> bool {
    matches!(self.kind, SymbolKind::Nonterminal { nullable: true, .. })
  }

  pub fn accessible(&self) -> bool {
    match self.kind {
      SymbolKind::Nonterminal { accessible, .. } => accessible,
      SymbolKind::Terminal { .. } => true,
    }
  }

  pub fn productive(&self) -> bool {
    match self.kind {
      SymbolKind::Nonterminal { productive, .. } => productive,
      SymbolKind::Terminal { .. } => true,
    }
  }

  pub fn rules(&self) -> &[RuleId] {
    match &self.kind {
      SymbolKind::Nonterminal { rules, .. } => rules.as_slice(),
      SymbolKind::Terminal { .. } => &[],
    }
  }
}
