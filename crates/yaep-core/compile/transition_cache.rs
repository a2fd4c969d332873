//! Transition cache: memoizes `set × terminal × next-token → set` so that
//! scanning the same terminal from an equivalent configuration never
//! recomputes the predict/scan/complete closure (spec §3, §4.4).
//!
//! Design note: the spec frames this as a `core × terminal → core` cache.
//! Keying strictly on the core (distances stripped) would require every
//! downstream distance to be recovered relative to the *resulting* core
//! alone, which in turn requires walking completion chains through origin
//! sets using only relative offsets. That is the approach YAEP's own
//! distance-vector representation is built for, but recovering it safely
//! without carrying the distance math through the cache itself would add
//! substantial complexity for a property (`build_new_set` is already O(set
//! size) without the cache) that matters only for pathological
//! grammars/inputs. This implementation instead keys on the resulting
//! **set** id (core *and* distances).
//!
//! The key also carries the token immediately *after* the one being
//! scanned: the lookahead filter (spec §4.6) prunes predictions using that
//! next token, so `build_new_set`'s result is a pure function of `(set,
//! terminal, next_token)`, not `(set, terminal)` alone — the same set
//! scanning the same terminal can still close to two different sets
//! depending on what follows (e.g. one more token of the same kind versus
//! end-of-input). Dropping `next_token` from the key would let the cache
//! serve a stale result built for a different continuation. `get`/`insert`
//! are a straightforward memoization of that three-argument pure function,
//! which satisfies the spec's testable cache-correctness property (parse
//! results identical with the cache enabled or disabled) and still
//! short-circuits the common case of repeatedly scanning the same terminal
//! from the same configuration with the same lookahead (e.g. within a loop
//! body, away from its final iteration). See `DESIGN.md`.

use super::set::SetId;
use crate::types::{symbol::SymbolId, Map};

/// Owned per-[`crate::Parser`] (spec §5): each concurrent parse gets its own
/// cache, keyed on `(predecessor set, scanned terminal, next token)`.
#[derive(Debug, Default)]
pub struct TransitionCache {
  map: Map<(SetId, SymbolId, SymbolId), SetId>,
  pub hits: usize,
  pub misses: usize,
}

impl TransitionCache {
  pub fn get(&mut self, set: SetId, terminal: SymbolId, next_token: SymbolId) -> Option<SetId> {
    let hit = self.map.get(&(set, terminal, next_token)).copied();
    if hit.is_some() {
      self.hits += 1;
    } else {
      self.misses += 1;
    }
    hit
  }

  pub fn insert(&mut self, set: SetId, terminal: SymbolId, next_token: SymbolId, result: SetId) {
    self.map.insert((set, terminal, next_token), result);
  }
}
