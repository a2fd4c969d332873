//! Item (situation) interner (spec §3, §4.2): `(rule, dot-position,
//! lookahead-context id)` triples, deduplicated exactly once per grammar
//! traversal.

use crate::{
  grammar::{
    analyzer,
    termset::{TermSet, TermSetId, TermSetInterner},
    Grammar,
  },
  types::{rule::RuleId, symbol::SymbolId, Map},
};

/// A dense index into a [`ItemInterner`]'s item arena. Stable for the
/// lifetime of the owning [`crate::Parser`]; items are never mutated after
/// interning, and pointer (id) equality is the legal test for item
/// equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub(crate) u32);

impl ItemId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// A triple `(rule, dot, lookahead-context)` representing a partial parse
/// (spec glossary: "Earley item (situation)").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Item {
  pub rule: RuleId,
  pub dot: u16,
  pub lookahead: TermSetId,
  /// `true` iff every symbol at `dot..rhs.len()` is nullable (spec §3).
  /// Precomputed at intern time so it never needs recomputing.
  pub empty_tail: bool,
}

impl Item {
  pub fn symbol_after_dot(&self, g: &Grammar) -> Option<SymbolId> {
    g.rule(self.rule).rhs.get(self.dot as usize).copied()
  }

  pub fn is_complete(&self, g: &Grammar) -> bool {
    self.dot as usize == g.rule(self.rule).rhs.len()
  }

  pub fn is_initial(&self) -> bool {
    self.dot == 0
  }

  pub fn lhs(&self, g: &Grammar) -> SymbolId {
    g.rule(self.rule).lhs
  }
}

/// Deduplicates `(rule, dot, lookahead)` triples so that every item exists
/// exactly once for the lifetime of the owning [`crate::Parser`] (spec
/// §4.2). Lives on [`crate::Parser`], not [`Grammar`] (spec §5's choice
/// (c): per-parser duplication for cache locality).
#[derive(Debug, Default)]
pub struct ItemInterner {
  table: Map<(RuleId, u16, TermSetId), ItemId>,
  items: Vec<Item>,
}

impl ItemInterner {
  /// Interns `(rule, dot, lookahead)`, computing `empty_tail` against `g`
  /// only on first insertion.
  pub fn intern(&mut self, g: &Grammar, rule: RuleId, dot: u16, lookahead: TermSetId) -> ItemId {
    let key = (rule, dot, lookahead);
    if let Some(&id) = self.table.get(&key) {
      return id;
    }
    let empty_tail = g.rule(rule).tail_is_nullable(dot as usize, |s| g.is_nullable(s));
    let id = ItemId(self.items.len() as u32);
    self.items.push(Item { rule, dot, lookahead, empty_tail });
    self.table.insert(key, id);
    id
  }

  /// Interns the item obtained by advancing `item`'s dot by one position,
  /// keeping the same lookahead context (spec §4.5: scanning/completing
  /// never changes a rule-instance's continuation context).
  pub fn advance(&mut self, g: &Grammar, item: Item) -> ItemId {
    self.intern(g, item.rule, item.dot + 1, item.lookahead)
  }

  pub fn get(&self, id: ItemId) -> Item {
    self.items[id.index()]
  }
}

/// FIRST(rhs[item.dot..]), extended with `item`'s own lookahead context if
/// that tail is fully nullable (spec §4.5 point 4's "right-context FIRST
/// set"). This is what the lookahead filter tests the next token against;
/// for a complete item it reduces to exactly the item's lookahead context.
pub fn right_context_first(g: &Grammar, lookahead_sets: &TermSetInterner, item: Item) -> TermSet {
  let rule = g.rule(item.rule);
  let tail = &rule.rhs[item.dot as usize..];
  analyzer::first_of_seq(&g.first_sets, tail, lookahead_sets.get(item.lookahead), &g.symbols)
}
