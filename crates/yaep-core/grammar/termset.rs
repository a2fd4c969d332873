//! Bit-set representation of terminal sets (spec §3, "TermSet"), interned so
//! that identical sets share storage. Used for FIRST sets and per-item
//! lookahead contexts.

use crate::types::{symbol::SymbolId, Map};
use std::sync::Arc;

const WORD_BITS: usize = 64;

/// A bit-vector over the grammar's dense symbol-id space. Only bits for
/// terminal ids are ever meaningfully set, but the vector is sized against
/// the whole symbol universe so that `SymbolId::index()` can be used
/// directly as a bit position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TermSet {
  words: Vec<u64>,
}

impl TermSet {
  pub fn with_universe(universe: usize) -> Self {
    Self { words: vec![0; universe.div_ceil(WORD_BITS)] }
  }

  pub fn insert(&mut self, sym: SymbolId) -> bool {
    let (w, b) = Self::pos(sym);
    self.ensure(w + 1);
    let before = self.words[w];
    self.words[w] |= 1 << b;
    self.words[w] != before
  }

  pub fn contains(&self, sym: SymbolId) -> bool {
    let (w, b) = Self::pos(sym);
    self.words.get(w).map(|word| word & (1 << b) != 0).unwrap_or(false)
  }

  pub fn is_empty(&self) -> bool {
    self.words.iter().all(|w| *w == 0)
  }

  /// Unions `other` into `self`, returning `true` iff `self` changed. Used
  /// by the fixed-point FIRST-set computation.
  pub fn union_with(&mut self, other: &TermSet) -> bool {
    self.ensure(other.words.len());
    let mut changed = false;
    for (a, b) in self.words.iter_mut().zip(other.words.iter()) {
      let before = *a;
      *a |= b;
      changed |= *a != before;
    }
    changed
  }

  pub fn iter(&self) -> impl Iterator<Item = SymbolId> + '_ {
    self.words.iter().enumerate().flat_map(|(w, word)| {
      (0..WORD_BITS).filter(move |b| word & (1 << b) != 0).map(move |b| SymbolId::from(w * WORD_BITS + b))
    })
  }

  fn pos(sym: SymbolId) -> (usize, usize) {
    (sym.index() / WORD_BITS, sym.index() % WORD_BITS)
  }

  fn ensure(&mut self, words: usize) {
    if self.words.len() < words {
      self.words.resize(words, 0);
    }
  }
}

/// A dense index into the grammar's [`TermSetInterner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermSetId(pub(crate) u32);

impl TermSetId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// Deduplicates [`TermSet`]s so that two item lookahead contexts built from
/// the same terminals share one allocation and one id (spec §4.3's "Why
/// intern").
#[derive(Debug, Default)]
pub struct TermSetInterner {
  table: Map<Arc<TermSet>, TermSetId>,
  sets: Vec<Arc<TermSet>>,
}

impl TermSetInterner {
  pub fn intern(&mut self, set: TermSet) -> TermSetId {
    if let Some(id) = self.table.get(&set) {
      return *id;
    }
    let id = TermSetId(self.sets.len() as u32);
    let set = Arc::new(set);
    self.sets.push(set.clone());
    self.table.insert(set, id);
    id
  }

  pub fn get(&self, id: TermSetId) -> &TermSet {
    &self.sets[id.index()]
  }
}
