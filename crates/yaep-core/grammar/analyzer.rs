//! Grammar analyzer (spec §4.1): nullable/accessible/productive by
//! fixed-point iteration, and FIRST sets for lookahead contexts.

use super::termset::TermSet;
use crate::types::{
  rule::Rule,
  symbol::{Symbol, SymbolId, SymbolKind},
  Array, Set,
};

/// Runs nullable/accessible/productive to a fixed point over `rules`,
/// writing the results back into `symbols`' [`SymbolKind::Nonterminal`]
/// flags.
pub fn analyze_fixed_points(symbols: &mut [Symbol], rules: &[Rule], start: SymbolId) {
  // Nullable: N is nullable iff some rule for N has an all-nullable RHS
  // (an empty RHS is vacuously all-nullable).
  loop {
    let mut changed = false;
    for rule in rules {
      let all_nullable = rule.rhs.iter().all(|s| is_nullable(symbols, *s));
      if all_nullable {
        if set_nullable(symbols, rule.lhs) {
          changed = true;
        }
      }
    }
    if !changed {
      break;
    }
  }

  // Productive: N is productive iff some rule for N has all-productive RHS
  // symbols (terminals are always productive).
  loop {
    let mut changed = false;
    for rule in rules {
      let all_productive = rule.rhs.iter().all(|s| is_productive(symbols, *s));
      if all_productive {
        if set_productive(symbols, rule.lhs) {
          changed = true;
        }
      }
    }
    if !changed {
      break;
    }
  }

  // Accessible: reflexive-transitive closure from the start symbol under
  // "appears on the RHS of a rule with accessible LHS".
  let mut reachable: Set<SymbolId> = Set::new();
  let mut queue = vec![start];
  reachable.insert(start);
  while let Some(sym) = queue.pop() {
    for rule in rules {
      if rule.lhs == sym {
        for rhs_sym in &rule.rhs {
          if reachable.insert(*rhs_sym) {
            queue.push(*rhs_sym);
          }
        }
      }
    }
  }
  for sym in reachable {
    set_accessible(symbols, sym);
  }
}

fn is_nullable(symbols: &[Symbol], sym: SymbolId) -> bool {
  symbols[sym.index()].nullable()
}

fn is_productive(symbols: &[Symbol], sym: SymbolId) -> bool {
  symbols[sym.index()].productive()
}

fn set_nullable(symbols: &mut [Symbol], sym: SymbolId) -> bool {
  if let SymbolKind::Nonterminal { nullable, .. } = &mut symbols[sym.index()].kind {
    if !*nullable {
      *nullable = true;
      return true;
    }
  }
  false
}

fn set_productive(symbols: &mut [Symbol], sym: SymbolId) -> bool {
  if let SymbolKind::Nonterminal { productive, .. } = &mut symbols[sym.index()].kind {
    if !*productive {
      *productive = true;
      return true;
    }
  }
  false
}

fn set_accessible(symbols: &mut [Symbol], sym: SymbolId) {
  if let SymbolKind::Nonterminal { accessible, .. } = &mut symbols[sym.index()].kind {
    *accessible = true;
  }
}

/// Computes FIRST(X) for every symbol X to a fixed point: terminals map to
/// their own singleton set, nonterminals to the union of FIRST(rhs) over
/// their rules (stopping the union early at the first non-nullable RHS
/// symbol, per the standard FIRST construction). The result is indexed by
/// `SymbolId` and owned directly by the grammar (it is immutable after
/// `prepare`, so it needs no interning of its own).
pub fn compute_first_sets(symbols: &[Symbol], rules: &[Rule]) -> Array<TermSet> {
  let universe = symbols.len();
  let mut raw: Array<TermSet> = symbols
    .iter()
    .map(|s| {
      let mut set = TermSet::with_universe(universe);
      if let SymbolKind::Terminal { .. } = s.kind {
        set.insert(s.id);
      }
      set
    })
    .collect();

  loop {
    let mut changed = false;
    for rule in rules {
      let addition = first_of_seq_raw(&raw, &rule.rhs, None, symbols);
      let lhs_idx = rule.lhs.index();
      let dst = &mut raw[lhs_idx];
      if dst.union_with(&addition) {
        changed = true;
      }
    }
    if !changed {
      break;
    }
  }

  raw
}

/// FIRST of a symbol string, extended with `context` if the whole string is
/// nullable (spec §4.1, §4.6). `context` is `None` at fixed-point
/// computation time (no outer context yet known); `Some` at prediction time,
/// where it is the producing item's own lookahead context.
fn first_of_seq_raw(first_sets: &[TermSet], seq: &[SymbolId], context: Option<&TermSet>, symbols: &[Symbol]) -> TermSet {
  let universe = first_sets.len();
  let mut out = TermSet::with_universe(universe);
  let mut all_nullable = true;
  for sym in seq {
    out.union_with(&first_sets[sym.index()]);
    if !is_nullable_symbol(symbols, *sym) {
      all_nullable = false;
      break;
    }
  }
  if all_nullable {
    if let Some(ctx) = context {
      out.union_with(ctx);
    }
  }
  out
}

fn is_nullable_symbol(symbols: &[Symbol], sym: SymbolId) -> bool {
  matches!(&symbols[sym.index()].kind, SymbolKind::Nonterminal { nullable: true, .. })
}

/// Public wrapper used by the recognizer (spec §4.6) to compute the
/// lookahead context for a predicted item from the producing item's
/// remaining tail and its own lookahead context.
pub fn first_of_seq(first_sets: &[TermSet], seq: &[SymbolId], context: &TermSet, symbols: &[Symbol]) -> TermSet {
  first_of_seq_raw(first_sets, seq, Some(context), symbols)
}
