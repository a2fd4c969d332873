//! The rule store (spec §4.1): productions `A → α # translation-spec`.

use super::Array;
use crate::types::symbol::SymbolId;

/// A dense index into [`crate::grammar::Grammar`]'s rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub(crate) u32);

impl RuleId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl From<usize> for RuleId {
  fn from(v: usize) -> Self {
    RuleId(v as u32)
  }
}

/// The syntax-directed translation attached to a rule (spec §3, §4.10).
#[derive(Debug, Clone)]
pub enum Translation {
  /// The node for this reduction *is* the node for `rhs[index]`.
  Forward(usize),
  /// Emit an abstract node with `name`, whose ordered children are the
  /// nodes at the given rhs positions.
  Anode { name: String, cost: u32, children: Array<usize> },
}

impl Translation {
  pub fn forward(index: usize) -> Self {
    Translation::Forward(index)
  }

  pub fn anode(name: impl Into<String>, cost: u32, children: &[usize]) -> Self {
    Translation::Anode { name: name.into(), cost, children: children.to_vec() }
  }
}

/// One production `lhs → rhs[0] rhs[1] ... rhs[n-1]`.
#[derive(Debug, Clone)]
pub struct Rule {
  pub id: RuleId,
  pub lhs: SymbolId,
  pub rhs: Array<SymbolId>,
  pub translation: Translation,
}

impl Rule {
  /// `true` iff every symbol at `dot..rhs.len()` is nullable, i.e. the
  /// item's `empty_tail` flag (spec §3).
  pub fn tail_is_nullable(&self, dot: usize, nullable: impl Fn(SymbolId) -> bool) -> bool {
    self.rhs[dot..].iter().all(|s| nullable(*s))
  }

  pub fn is_empty(&self) -> bool {
    self.rhs.is_empty()
  }
}
