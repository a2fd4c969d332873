//! The Earley recognizer main loop (spec §4.4–§4.6): predict/scan/complete,
//! Leo's right-recursion shortcut, and minimal-cost error recovery (§4.8).
//!
//! [`Parser`] owns every interner private to one recognition run (spec §5,
//! choice (c): per-parser duplication of items/cores/sets/lookahead contexts
//! rather than sharing them across concurrent parses against the same
//! [`Grammar`]). It is built fresh per `parse()` call and, on success, kept
//! alive so [`crate::translate`] can walk the parse list it produced.

use std::collections::VecDeque;

use crate::{
  compile::{
    core::{CoreId, CoreInterner, CoreSymbVect},
    item::{right_context_first, ItemId, ItemInterner},
    leo::{LeoItem, LeoTable},
    set::{ParseList, SetId, SetInterner},
    transition_cache::TransitionCache,
  },
  grammar::{analyzer, termset::TermSet, termset::TermSetInterner, Grammar},
  types::{symbol::SymbolId, Map, Set},
  YaepError,
};

/// Caller-supplied attribute payload threaded through to `Terminal`
/// translation nodes unchanged (spec §3's "token attribute").
pub type TokenAttr = i64;

/// Diagnostic handed to the `on_syntax_error` callback when recovery fires
/// (spec §4.8, §6).
#[derive(Debug, Clone, Copy)]
pub struct SyntaxErrorInfo {
  /// Input position (token index) where the scan first failed.
  pub position: usize,
  /// Extra tokens absorbed beyond the one at `position` itself — the
  /// search's `i` (already-scanned tokens reinterpreted backward) plus `j`
  /// (additional tokens accepted forward), per spec §4.8.
  pub tokens_skipped: usize,
  /// Total number of input tokens absorbed into the synthetic `error`
  /// match, including the one at `position`: `tokens_skipped + 1`.
  pub tokens_ignored: usize,
}

/// Upper bound on how far `attempt_error_recovery` will back up past the
/// failure point when searching the `i` (backward) dimension. The spec
/// leaves this bound implementation-defined; a small constant keeps worst
/// case recovery search cost bounded independent of how far into the input
/// the failure occurs.
const MAX_BACK_FRONTIER: usize = 16;

/// One Earley recognition run. See the module doc for why this owns its own
/// interners instead of sharing them with the grammar.
pub struct Parser<'g> {
  grammar: &'g Grammar,
  items: ItemInterner,
  cores: CoreInterner,
  sets: SetInterner,
  lookaheads: TermSetInterner,
  symb_vect_cache: Map<CoreId, CoreSymbVect>,
  transitions: TransitionCache,
  leo: LeoTable,
  pl: ParseList,
  tokens: Vec<(SymbolId, TokenAttr)>,
}

impl<'g> Parser<'g> {
  pub fn new(grammar: &'g Grammar) -> Self {
    Parser {
      grammar,
      items: ItemInterner::default(),
      cores: CoreInterner::default(),
      sets: SetInterner::default(),
      lookaheads: TermSetInterner::default(),
      symb_vect_cache: Map::new(),
      transitions: TransitionCache::default(),
      leo: LeoTable::default(),
      pl: ParseList::default(),
      tokens: Vec::new(),
    }
  }

  pub fn grammar(&self) -> &'g Grammar {
    self.grammar
  }

  pub fn parse_list_len(&self) -> usize {
    self.pl.len()
  }

  pub fn set_at(&self, k: usize) -> SetId {
    self.pl.get(k)
  }

  pub fn sets(&self) -> &SetInterner {
    &self.sets
  }

  pub fn cores(&self) -> &CoreInterner {
    &self.cores
  }

  pub fn items(&self) -> &ItemInterner {
    &self.items
  }

  pub fn lookaheads(&self) -> &TermSetInterner {
    &self.lookaheads
  }

  pub fn tokens(&self) -> &[(SymbolId, TokenAttr)] {
    &self.tokens
  }

  pub fn transition_cache_stats(&self) -> (usize, usize) {
    (self.transitions.hits, self.transitions.misses)
  }

  pub fn leo_stats(&self) -> (usize, usize) {
    (self.leo.n_items_created, self.leo.n_completions_used)
  }

  /// Recognizes a token stream against `grammar`, returning the finished
  /// `Parser` (its parse list, interners, and consumed tokens) on success so
  /// [`crate::translate`] can build a tree or forest from it.
  ///
  /// `read_token` is drained eagerly up front: this lets the lookahead
  /// filter (spec §4.6) peek one token ahead of the scan position and lets
  /// error recovery replay already-read tokens without re-entering the
  /// caller's token source.
  pub fn parse(
    grammar: &'g Grammar,
    mut read_token: impl FnMut() -> Option<(i32, TokenAttr)>,
    mut on_syntax_error: impl FnMut(SyntaxErrorInfo),
  ) -> crate::Result<Self> {
    let parser = Self::new(grammar);
    parser.run(&mut read_token, &mut on_syntax_error)
  }

  fn run(
    mut self,
    read_token: &mut dyn FnMut() -> Option<(i32, TokenAttr)>,
    on_syntax_error: &mut dyn FnMut(SyntaxErrorInfo),
  ) -> crate::Result<Self> {
    let mut stream: Vec<(SymbolId, TokenAttr)> = Vec::new();
    while let Some((code, attr)) = read_token() {
      let sym = self.grammar.symbol_by_code(code).ok_or_else(|| YaepError::InvalidTokenCode(code).record())?;
      stream.push((sym, attr));
    }
    let n = stream.len();

    let mut eof_context = TermSet::with_universe(self.grammar.symbols().len());
    eof_context.insert(self.grammar.eof());
    let eof_context = self.lookaheads.intern(eof_context);
    let root_seed = self.items.intern(self.grammar, self.grammar.augmented_start, 0, eof_context);

    let set0 = self.close_set(0, Vec::new(), vec![root_seed], peek_symbol(self.grammar, &stream, 0));
    self.pl.push(set0);

    let mut pos = 0usize;
    while pos < n {
      let (token_sym, _) = stream[pos];
      let prev_pos = pos;
      let prev_set_id = self.pl.get(prev_pos);
      let next_tok = peek_symbol(self.grammar, &stream, prev_pos + 1);

      if self.grammar.config.transition_cache_enabled {
        if let Some(cached) = self.transitions.get(prev_set_id, token_sym, next_tok) {
          log::trace!("transition cache hit at position {prev_pos} scanning {token_sym:?}");
          self.pl.push(cached);
          pos += 1;
          continue;
        }
      }

      let scanned = self.scan(prev_pos, token_sym);
      if scanned.is_empty() {
        if self.grammar.config.error_recovery {
          log::debug!("scan failed at position {prev_pos}, entering error recovery");
          if let Some(resume_pos) = self.attempt_error_recovery(&stream, prev_pos, on_syntax_error) {
            pos = resume_pos;
            continue;
          }
        }
        return Err(YaepError::ParseError { position: prev_pos }.record());
      }

      let new_set = self.close_set(prev_pos + 1, scanned, Vec::new(), next_tok);
      if self.grammar.config.transition_cache_enabled {
        self.transitions.insert(prev_set_id, token_sym, next_tok, new_set);
      }
      self.pl.push(new_set);
      pos += 1;
    }

    self.tokens = stream;

    if !self.is_accepted() {
      let position = self.pl.last_index();
      return Err(YaepError::ParseError { position }.record());
    }

    Ok(self)
  }

  /// `true` iff the final parse-list set contains a completed augmented
  /// start item whose origin is position 0 (spec §4.4's success condition).
  fn is_accepted(&self) -> bool {
    let final_pos = self.pl.last_index();
    let final_set = self.sets.get(self.pl.last()).clone();
    let final_core = self.cores.get(final_set.core).clone();
    final_core.items.iter().enumerate().any(|(idx, &id)| {
      let item = self.items.get(id);
      if item.rule != self.grammar.augmented_start || !item.is_complete(self.grammar) {
        return false;
      }
      let origin =
        if idx < final_core.n_start { final_pos - final_set.distances[idx] as usize } else { final_pos };
      origin == 0
    })
  }

  /// Scans `terminal` out of the set at `prev_pos`, returning the advanced
  /// `(item, origin)` pairs that become the new set's start items (spec
  /// §4.5 point 1).
  fn scan(&mut self, prev_pos: usize, terminal: SymbolId) -> Vec<(ItemId, usize)> {
    let prev_set = self.sets.get(self.pl.get(prev_pos)).clone();
    let prev_core = self.cores.get(prev_set.core).clone();
    let idxs = self.symb_vect(prev_set.core).transitions_on(terminal).to_vec();

    let mut out = Vec::with_capacity(idxs.len());
    for idx in idxs {
      let item_id = prev_core.items[idx];
      let item = self.items.get(item_id);
      let origin = if idx < prev_core.n_start { prev_pos - prev_set.distances[idx] as usize } else { prev_pos };
      out.push((self.items.advance(self.grammar, item), origin));
    }
    out
  }

  /// Builds the [`CoreSymbVect`] for `core_id` on first use and caches it;
  /// every later scan/completion against the same core reuses it.
  fn symb_vect(&mut self, core_id: CoreId) -> &CoreSymbVect {
    if !self.symb_vect_cache.contains_key(&core_id) {
      let core = self.cores.get(core_id).clone();
      let sv = CoreSymbVect::build(&core, &self.items, self.grammar);
      self.symb_vect_cache.insert(core_id, sv);
    }
    self.symb_vect_cache.get(&core_id).expect("just inserted")
  }

  /// Runs predict/complete to closure over the given start items (already
  /// scanned or recovered, each with its absolute origin) plus, for the
  /// very first set only, the synthetic root seeds that kick off
  /// prediction. Returns the interned `SetId` of the resulting set at
  /// position `k`.
  fn close_set(
    &mut self,
    k: usize,
    start_items: Vec<(ItemId, usize)>,
    extra_predicted_seeds: Vec<ItemId>,
    next_token: SymbolId,
  ) -> SetId {
    let mut items_in_set: Vec<(ItemId, usize)> = Vec::with_capacity(start_items.len());
    let mut predicted_seen: Set<ItemId> = Set::new();
    let mut predicted_items: Vec<ItemId> = Vec::new();
    let mut waiting_on_live: Map<SymbolId, Vec<(ItemId, usize)>> = Map::new();
    let mut queue: VecDeque<(ItemId, usize)> = VecDeque::new();

    // Start items: dedup by the exact (item, origin) pair via linear scan
    // (spec §4.9 — ambiguity means the same (rule, dot) can legitimately
    // recur at different origins within one set, so origin is part of the
    // identity here even though it is not part of `ItemId`).
    for (id, origin) in start_items {
      if !items_in_set.iter().any(|&(i, o)| i == id && o == origin) {
        items_in_set.push((id, origin));
        queue.push_back((id, origin));
      }
    }
    for id in extra_predicted_seeds {
      if predicted_seen.insert(id) {
        predicted_items.push(id);
        queue.push_back((id, k));
      }
    }

    while let Some((id, origin)) = queue.pop_front() {
      let item = self.items.get(id);

      if item.is_complete(self.grammar) {
        let lhs = item.lhs(self.grammar);
        let advances = self.complete_against(k, origin, lhs, &waiting_on_live);
        for (new_id, new_origin) in advances {
          if !items_in_set.iter().any(|&(i, o)| i == new_id && o == new_origin) {
            items_in_set.push((new_id, new_origin));
            queue.push_back((new_id, new_origin));
          }
        }
        continue;
      }

      let Some(sym) = item.symbol_after_dot(self.grammar) else { continue };
      if !self.grammar.symbol(sym).is_nonterminal() {
        // Terminal after the dot: nothing to do until the next token is
        // scanned; `scan` will pick this item up via `symb_vect`.
        continue;
      }

      waiting_on_live.entry(sym).or_default().push((id, origin));

      let rule = self.grammar.rule(item.rule);
      let rest = &rule.rhs[(item.dot as usize + 1)..];
      let ctx = analyzer::first_of_seq(&self.grammar.first_sets, rest, self.lookaheads.get(item.lookahead), self.grammar.symbols());
      let ctx_id = self.lookaheads.intern(ctx);

      for &rule_id in self.grammar.symbol(sym).rules() {
        let new_id = self.items.intern(self.grammar, rule_id, 0, ctx_id);

        if self.grammar.config.lookahead_level >= 1 {
          let new_item = self.items.get(new_id);
          let rcf = right_context_first(self.grammar, &self.lookaheads, new_item);
          let is_recovery_escape = self.grammar.error_symbol().map_or(false, |e| rcf.contains(e));
          if !rcf.contains(next_token) && !is_recovery_escape {
            // Dead prediction (spec §4.6): no expansion of this rule could
            // ever consume the upcoming token. Productions that can start
            // with the `error` sentinel are never pruned this way — by
            // construction they exist to handle a token the normal
            // alternatives don't expect (spec §4.8).
            continue;
          }
        }

        if predicted_seen.insert(new_id) {
          predicted_items.push(new_id);
          queue.push_back((new_id, k));
        }
      }
    }

    let n_start = items_in_set.len();
    let mut ids = Vec::with_capacity(n_start);
    let mut distances = Vec::with_capacity(n_start);
    for (id, origin) in items_in_set {
      ids.push(id);
      distances.push((k - origin) as u32);
    }
    let core = self.cores.intern(ids, predicted_items);
    let set_id = self.sets.intern(core, distances);
    log::trace!("closed set {set_id:?} at position {k} ({n_start} start items)");
    set_id
  }

  /// Advances every item waiting on `lhs`, given that it just completed
  /// with origin `origin` while building the set at position `k` (spec
  /// §4.5 point 2, with Leo's shortcut from §4.7 consulted first).
  fn complete_against(
    &mut self,
    k: usize,
    origin: usize,
    lhs: SymbolId,
    waiting_on_live: &Map<SymbolId, Vec<(ItemId, usize)>>,
  ) -> Vec<(ItemId, usize)> {
    // Origin equal to the set under construction means this completion
    // derived `lhs` from nothing (an empty rule) at this very position
    // (Aycock–Horspool's nullable fix): its waiters are only tracked in the
    // not-yet-finalized `waiting_on_live` map, never in a core.
    if origin == k {
      let Some(waiters) = waiting_on_live.get(&lhs) else { return Vec::new() };
      return waiters
        .iter()
        .map(|&(waiter_id, waiter_origin)| {
          let waiter = self.items.get(waiter_id);
          (self.items.advance(self.grammar, waiter), waiter_origin)
        })
        .collect();
    }

    if self.grammar.config.leo_enabled {
      if let Some(leo) = self.leo.lookup(origin, lhs) {
        log::trace!("Leo shortcut used for origin {origin} at position {k}");
        return vec![(leo.target_item, leo.target_origin)];
      }
    }

    let origin_set = self.sets.get(self.pl.get(origin)).clone();
    let origin_core = self.cores.get(origin_set.core).clone();
    let waiter_idxs = self.symb_vect(origin_set.core).reduces_on(lhs).to_vec();

    if let [idx] = waiter_idxs[..] {
      let waiter_id = origin_core.items[idx];
      let waiter_origin =
        if idx < origin_core.n_start { origin - origin_set.distances[idx] as usize } else { origin };
      let waiter = self.items.get(waiter_id);
      let advanced_id = self.items.advance(self.grammar, waiter);
      let advanced = self.items.get(advanced_id);
      if advanced.is_complete(self.grammar) && self.grammar.config.leo_enabled {
        // This single-waiter chain is itself a deterministic right-recursive
        // reduction: cache the shortcut so a later completion of
        // `advanced`'s lhs with origin `k` skips straight here instead of
        // walking back through this set again.
        log::debug!("Leo item installed for lhs at position {k}, origin {waiter_origin}");
        self.leo.install(k, advanced.lhs(self.grammar), LeoItem { target_item: advanced_id, target_origin: waiter_origin });
      }
      return vec![(advanced_id, waiter_origin)];
    }

    waiter_idxs
      .into_iter()
      .map(|idx| {
        let waiter_id = origin_core.items[idx];
        let waiter_origin =
          if idx < origin_core.n_start { origin - origin_set.distances[idx] as usize } else { origin };
        let waiter = self.items.get(waiter_id);
        (self.items.advance(self.grammar, waiter), waiter_origin)
      })
      .collect()
  }

  /// Reconstructs the `(item, origin)` start items of `set_id`, given that it
  /// sits at parse-list position `k` (spec §3's distance-vector recovery:
  /// `origin = k - distance`). Used by `attempt_error_recovery` to carry an
  /// error-recovery set's items forward across parse-list positions that
  /// don't correspond to any new grammar-level advance.
  fn start_items_of(&self, set_id: SetId, k: usize) -> Vec<(ItemId, usize)> {
    let set = self.sets.get(set_id);
    let core = self.cores.get(set.core);
    core.start_items().iter().zip(set.distances.iter()).map(|(&id, &d)| (id, k - d as usize)).collect()
  }

  /// Minimal-cost error recovery (spec §4.8): searches ascending `(i, j)` —
  /// `i` existing tokens reinterpreted backward past the failure point, `j`
  /// additional tokens (including the one that failed to scan) accepted
  /// forward as part of a synthetic `error` match — for the smallest total
  /// `i + j` that lets the match, followed by ordinary scanning, succeed for
  /// `recovery_token_matches` further tokens (or run out of input). Ties on
  /// `i + j` are broken by the earliest resulting resume position, which
  /// falls out of iterating `j` ascending for each fixed total. Returns the
  /// position scanning should resume from.
  ///
  /// The parse list holds exactly one set per real token consumed (spec
  /// §3), so every one of the `i + j` absorbed positions between the
  /// backward anchor and the resume position gets its own `pl` entry: the
  /// first is the actual scan of `error_sym`, and every later one just
  /// carries that same advanced item set forward unchanged via
  /// `start_items_of`, since nothing new is predicted or completed while
  /// still inside the error span.
  fn attempt_error_recovery(
    &mut self,
    stream: &[(SymbolId, TokenAttr)],
    fail_pos: usize,
    on_syntax_error: &mut dyn FnMut(SyntaxErrorInfo),
  ) -> Option<usize> {
    let error_sym = self.grammar.error_symbol()?;
    let matches_needed = self.grammar.config.recovery_token_matches as usize;
    let n = stream.len();
    let checkpoint_len = self.pl.len();
    let checkpoint = self.pl.snapshot(checkpoint_len);
    let max_back = fail_pos.min(MAX_BACK_FRONTIER);
    let max_forward = n - fail_pos;

    log::debug!("error recovery search starting at position {fail_pos} (max_back={max_back}, max_forward={max_forward})");

    for total in 0..=(max_back + max_forward.saturating_sub(1)) {
      for j in 1..=(total + 1).min(max_forward) {
        let i = total + 1 - j;
        if i > max_back {
          continue;
        }
        let anchor = fail_pos - i;
        let resume_pos = fail_pos + j;

        log::trace!("trying recovery candidate i={i} j={j} (anchor={anchor}, resume_pos={resume_pos})");

        self.pl.truncate(anchor + 1);
        let error_scanned = self.scan(anchor, error_sym);
        if error_scanned.is_empty() {
          self.pl.restore(&checkpoint);
          continue;
        }

        let mut aborted = false;
        let mut cur = anchor;
        let mut carry = error_scanned;
        while cur < resume_pos {
          let next_tok = peek_symbol(self.grammar, stream, cur + 1);
          let next_set = self.close_set(cur + 1, carry, Vec::new(), next_tok);
          self.pl.push(next_set);
          cur += 1;
          if cur < resume_pos {
            carry = self.start_items_of(next_set, cur);
            if carry.is_empty() {
              aborted = true;
              break;
            }
          }
        }
        if aborted {
          self.pl.restore(&checkpoint);
          continue;
        }

        let target = (resume_pos + matches_needed).min(n);
        let mut probe_pos = resume_pos;
        let mut ok = true;
        while probe_pos < target {
          let (tok_sym, _) = stream[probe_pos];
          let probe_prev = self.pl.last_index();
          let scanned = self.scan(probe_prev, tok_sym);
          if scanned.is_empty() {
            ok = false;
            break;
          }
          let peek = peek_symbol(self.grammar, stream, probe_pos + 1);
          let next_set = self.close_set(probe_prev + 1, scanned, Vec::new(), peek);
          self.pl.push(next_set);
          probe_pos += 1;
        }

        if ok {
          self.pl.truncate(resume_pos + 1);
          let tokens_skipped = i + j - 1;
          log::debug!("error recovery succeeded: resume_pos={resume_pos}, tokens_skipped={tokens_skipped}");
          on_syntax_error(SyntaxErrorInfo { position: fail_pos, tokens_skipped, tokens_ignored: tokens_skipped + 1 });
          return Some(resume_pos);
        }
        self.pl.restore(&checkpoint);
      }
    }

    None
  }
}

/// The symbol of the token at `idx`, or `eof` if the stream is exhausted —
/// used both to seed the very first set's lookahead filter and to peek one
/// token ahead of the current scan position (spec §4.6).
fn peek_symbol(grammar: &Grammar, stream: &[(SymbolId, TokenAttr)], idx: usize) -> SymbolId {
  stream.get(idx).map(|&(s, _)| s).unwrap_or_else(|| grammar.eof())
}
