//! LR(0) core interning and the per-core `(core, symbol) -> waiting items`
//! index used for scanning and completion (spec §3, §4.3).

use super::item::{Item, ItemId, ItemInterner};
use crate::{
  grammar::Grammar,
  types::{symbol::SymbolId, Map},
};

/// A dense index into a [`CoreInterner`]'s core arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CoreId(pub(crate) u32);

impl CoreId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// The LR(0) projection of an Earley set: its items with distances
/// stripped, in canonical order (spec §4.3) — start items (`dot > 0`) in
/// the order they were added, then predicted items (`dot = 0`) in the
/// order prediction closure produced them.
#[derive(Debug, Clone)]
pub struct Core {
  pub items: Vec<ItemId>,
  pub n_start: usize,
}

impl Core {
  pub fn start_items(&self) -> &[ItemId] {
    &self.items[..self.n_start]
  }

  pub fn predicted_items(&self) -> &[ItemId] {
    &self.items[self.n_start..]
  }
}

/// Deduplicates cores by their canonical item sequence (spec §4.3): two
/// recognition paths that arrive at the same item set, in the same
/// canonical order, share a `CoreId`.
#[derive(Debug, Default)]
pub struct CoreInterner {
  table: Map<Vec<ItemId>, CoreId>,
  cores: Vec<Core>,
}

impl CoreInterner {
  /// Interns a core given its start items (already in insertion order) and
  /// predicted items (already in prediction order). The two are
  /// concatenated to form the canonical key.
  pub fn intern(&mut self, start_items: Vec<ItemId>, predicted_items: Vec<ItemId>) -> CoreId {
    let n_start = start_items.len();
    let mut items = start_items;
    items.extend(predicted_items);
    if let Some(&id) = self.table.get(&items) {
      return id;
    }
    let id = CoreId(self.cores.len() as u32);
    self.cores.push(Core { items: items.clone(), n_start });
    self.table.insert(items, id);
    id
  }

  pub fn get(&self, id: CoreId) -> &Core {
    &self.cores[id.index()]
  }

  /// Number of distinct cores interned so far.
  pub fn len(&self) -> usize {
    self.cores.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cores.is_empty()
  }
}

/// Per-`(core, symbol)` index: for every symbol that appears immediately
/// after the dot in some item of the core, the positions (indices into
/// `core.items`) of those items. Used both for scanning on a terminal and
/// for completion lookup on a nonterminal (spec §4.3's `CoreSymbVect`); the
/// two roles share one table since both ask "which items in this core are
/// waiting on symbol X", differing only in whether X is a terminal or a
/// completed nonterminal.
#[derive(Debug, Default)]
pub struct CoreSymbVect {
  waiting: Map<SymbolId, Vec<usize>>,
}

impl CoreSymbVect {
  pub fn build(core: &Core, items: &ItemInterner, g: &Grammar) -> Self {
    let mut waiting: Map<SymbolId, Vec<usize>> = Map::new();
    for (idx, &item_id) in core.items.iter().enumerate() {
      let item: Item = items.get(item_id);
      if let Some(sym) = item.symbol_after_dot(g) {
        waiting.entry(sym).or_default().push(idx);
      }
    }
    Self { waiting }
  }

  /// Items in the core whose dot is immediately before `sym` (spec
  /// §4.5.1's scan).
  pub fn transitions_on(&self, sym: SymbolId) -> &[usize] {
    self.waiting.get(&sym).map(|v| v.as_slice()).unwrap_or(&[])
  }

  /// Items in the core whose dot is immediately before the completed
  /// nonterminal `sym` (spec §4.5.2's completion lookup). Structurally
  /// identical to `transitions_on`; kept as a separate name to match the
  /// spec's two conceptual roles.
  pub fn reduces_on(&self, sym: SymbolId) -> &[usize] {
    self.transitions_on(sym)
  }
}
