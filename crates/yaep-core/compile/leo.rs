//! Leo's right-recursion optimization (spec §4.7): collapses deterministic
//! right-recursive completion chains into a single cached jump.

use super::item::ItemId;
use crate::types::{symbol::SymbolId, Map};

/// A cached pointer to the top of a deterministic right-recursive
/// completion chain.
#[derive(Debug, Clone, Copy)]
pub struct LeoItem {
  pub target_item: ItemId,
  pub target_origin: usize,
}

/// Created opportunistically during recognition and scoped to one
/// `parse()` call — it is a property of the specific token stream being
/// recognized, not of the grammar, so it lives on [`crate::Parser`] and is
/// never shared across parses.
#[derive(Debug, Default)]
pub struct LeoTable {
  map: Map<(usize, SymbolId), LeoItem>,
  pub n_items_created: usize,
  pub n_completions_used: usize,
}

impl LeoTable {
  pub fn lookup(&mut self, set_index: usize, nonterm: SymbolId) -> Option<LeoItem> {
    let hit = self.map.get(&(set_index, nonterm)).copied();
    if hit.is_some() {
      self.n_completions_used += 1;
    }
    hit
  }

  pub fn install(&mut self, set_index: usize, nonterm: SymbolId, entry: LeoItem) {
    self.map.insert((set_index, nonterm), entry);
    self.n_items_created += 1;
  }
}
