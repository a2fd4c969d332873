//! Set interning and the parse list (spec §3, §4.3).

use super::core::CoreId;
use crate::types::Map;

/// A dense index into a [`SetInterner`]'s set arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SetId(pub(crate) u32);

impl SetId {
  pub fn index(self) -> usize {
    self.0 as usize
  }
}

/// A core plus the origins of its start items (spec §3's "Set"): the
/// distance vector has one entry per start item, each an index into the
/// parse list giving that start item's origin set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EarleySet {
  pub core: CoreId,
  pub distances: Vec<u32>,
}

/// Deduplicates `(core, distance-vector)` pairs (spec §4.3): distinct
/// recognition positions that happen to share both core and distances
/// collapse to one `SetId`, which is what bounds parse-list memory to
/// O(distinct sets) rather than O(input length).
#[derive(Debug, Default)]
pub struct SetInterner {
  table: Map<(CoreId, Vec<u32>), SetId>,
  sets: Vec<EarleySet>,
}

impl SetInterner {
  pub fn intern(&mut self, core: CoreId, distances: Vec<u32>) -> SetId {
    let key = (core, distances);
    if let Some(&id) = self.table.get(&key) {
      return id;
    }
    let id = SetId(self.sets.len() as u32);
    self.sets.push(EarleySet { core: key.0, distances: key.1.clone() });
    self.table.insert(key, id);
    id
  }

  pub fn get(&self, id: SetId) -> &EarleySet {
    &self.sets[id.index()]
  }

  /// Number of distinct sets interned so far.
  pub fn len(&self) -> usize {
    self.sets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sets.is_empty()
  }
}

/// The indexed sequence of sets built during one `parse()` call: `pl[k]` is
/// the state after consuming `k` tokens (spec §3). Owned exclusively by the
/// [`crate::Parser`] driving the recognition; grows monotonically during
/// ordinary scanning. Error recovery's search (spec §4.8) is the one
/// exception: it speculatively extends the list past a candidate recovery
/// point and `truncate`s back to retry another candidate, so a slot can be
/// removed, but only ever one already installed by that same in-progress
/// search — nothing earlier than the failure point is ever rolled back.
#[derive(Debug, Default)]
pub struct ParseList {
  pub pl: Vec<SetId>,
}

impl ParseList {
  pub fn push(&mut self, set: SetId) -> usize {
    self.pl.push(set);
    self.pl.len() - 1
  }

  pub fn len(&self) -> usize {
    self.pl.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pl.is_empty()
  }

  pub fn get(&self, k: usize) -> SetId {
    self.pl[k]
  }

  pub fn last(&self) -> SetId {
    *self.pl.last().expect("parse list must contain at least the initial set")
  }

  pub fn last_index(&self) -> usize {
    self.pl.len() - 1
  }

  pub fn truncate(&mut self, len: usize) {
    self.pl.truncate(len);
  }

  /// Snapshot of the first `len` entries, for a speculative search (error
  /// recovery, spec §4.8) that needs to undo a `truncate` past entries it
  /// has already discarded — `truncate` alone cannot grow the list back.
  pub fn snapshot(&self, len: usize) -> Vec<SetId> {
    self.pl[..len].to_vec()
  }

  /// Restores the list to exactly `snapshot`'s contents, discarding
  /// whatever speculative entries are currently past it.
  pub fn restore(&mut self, snapshot: &[SetId]) {
    self.pl.clear();
    self.pl.extend_from_slice(snapshot);
  }
}
