//! Translation tree / shared packed forest construction (spec §4.10).
//!
//! Rather than threading parent pointers through the recognizer, this walks
//! the completed parse list backward on demand: for a nonterminal `A`
//! spanning `[start, end)`, every completed item for `A` ending at `end`
//! with origin `start` is found directly off that set's core and distance
//! vector (spec §4.3), and each rule's right-hand side is matched against
//! the span recursively, memoized per `(symbol, start, end)` and per
//! `(rule, dot, start, end)`. This is the same information a parent-pointer
//! walk would use — `Parser`'s interners are a complete, immutable record
//! of every item/core/set reached — without needing recognition itself to
//! carry extra bookkeeping for a step that only runs once, after success.

use std::collections::HashMap;

use crate::{
  grammar::Grammar,
  recognize::{Parser, TokenAttr},
  types::{
    rule::{Rule, RuleId, Translation},
    symbol::SymbolId,
    Set,
  },
  YaepError,
};

/// A dense index into a [`Forest`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
  fn index(self) -> usize {
    self.0 as usize
  }
}

/// One node of a translation tree (spec §3, §4.10).
#[derive(Debug, Clone)]
pub enum TranslationNode {
  /// A scanned input token, carrying the attribute supplied by the caller's
  /// token reader.
  Terminal { symbol: SymbolId, attr: TokenAttr },
  /// An abstract node produced by a rule's `Anode` translation.
  Anode { name: String, cost: u32, children: Vec<NodeId> },
  /// Two or more derivations packed at the same point (present only when
  /// `one_parse` is disabled and the grammar is genuinely ambiguous here,
  /// spec §4.10).
  Alt { alternatives: Vec<NodeId> },
  /// Two or more real input tokens absorbed by a single `error` rhs slot
  /// during multi-token recovery (spec §4.8's `i`/`j` search), in input
  /// order. A span of exactly one token is represented as a bare
  /// `Terminal` instead — this variant only appears for longer spans.
  ErrorSpan { tokens: Vec<NodeId> },
}

/// An arena of [`TranslationNode`]s built by one [`build`] call. Freed in
/// one step when dropped — no caller-supplied allocator/destructor pair
/// (spec §6.3's redesign away from the C alloc/free callback model).
#[derive(Debug, Default)]
pub struct Forest {
  nodes: Vec<TranslationNode>,
}

impl Forest {
  pub fn get(&self, id: NodeId) -> &TranslationNode {
    &self.nodes[id.index()]
  }

  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  fn push(&mut self, node: TranslationNode) -> NodeId {
    let id = NodeId(self.nodes.len() as u32);
    self.nodes.push(node);
    id
  }

  /// Summed cost of `id`'s subtree: zero for terminals, a node's own cost
  /// plus its children's for `Anode`, the minimum over alternatives for
  /// `Alt` (spec §4.10's cost-minimal selection).
  pub fn cost(&self, id: NodeId) -> u32 {
    match self.get(id) {
      TranslationNode::Terminal { .. } => 0,
      TranslationNode::Anode { cost, children, .. } => cost + children.iter().map(|&c| self.cost(c)).sum::<u32>(),
      TranslationNode::Alt { alternatives } => alternatives.iter().map(|&a| self.cost(a)).min().unwrap_or(0),
      TranslationNode::ErrorSpan { tokens } => tokens.iter().map(|&t| self.cost(t)).sum(),
    }
  }
}

/// The outcome of [`build`]: the forest, its root, and whether more than one
/// derivation existed anywhere in it — even when `one_parse` collapsed them
/// to a single tree (spec §4.10).
pub struct TranslationOutcome {
  pub forest: Forest,
  pub root: NodeId,
  pub ambiguous: bool,
}

/// Builds a [`TranslationOutcome`] from a successfully recognized `parser`.
pub fn build<'g>(parser: &Parser<'g>) -> crate::Result<TranslationOutcome> {
  Translator::new(parser).run()
}

struct Translator<'p, 'g> {
  g: &'g Grammar,
  parser: &'p Parser<'g>,
  forest: Forest,
  ambiguous: bool,
  one_parse: bool,
  cost: bool,
  nonterm_cache: HashMap<(SymbolId, usize, usize), Vec<NodeId>>,
  seq_cache: HashMap<(RuleId, usize, usize, usize), Vec<Vec<NodeId>>>,
}

impl<'p, 'g> Translator<'p, 'g> {
  fn new(parser: &'p Parser<'g>) -> Self {
    let config = parser.grammar().config;
    Translator {
      g: parser.grammar(),
      parser,
      forest: Forest::default(),
      ambiguous: false,
      one_parse: config.one_parse,
      cost: config.cost,
      nonterm_cache: HashMap::new(),
      seq_cache: HashMap::new(),
    }
  }

  fn run(mut self) -> crate::Result<TranslationOutcome> {
    let n = self.parser.tokens().len();
    let start_sym = self.g.start();
    let candidates = self.nonterm_derivations(start_sym, 0, n);
    if candidates.is_empty() {
      return Err(YaepError::ParseError { position: n }.record());
    }
    let root = self.select(candidates);
    Ok(TranslationOutcome { forest: self.forest, root, ambiguous: self.ambiguous })
  }

  /// Chooses among `candidates` (all valid derivations of the same
  /// (symbol, span) or (rule, split) point): in `one_parse` mode, the
  /// cost-minimal or first-found single node; otherwise the sole candidate,
  /// or an `Alt` packing all of them. Flags `ambiguous` whenever more than
  /// one candidate existed, regardless of mode.
  fn select(&mut self, candidates: Vec<NodeId>) -> NodeId {
    if candidates.len() > 1 {
      self.ambiguous = true;
    }
    if self.one_parse {
      if self.cost {
        candidates.into_iter().min_by_key(|&id| self.forest.cost(id)).expect("select called with candidates")
      } else {
        candidates.into_iter().next().expect("select called with candidates")
      }
    } else if candidates.len() == 1 {
      candidates.into_iter().next().expect("checked len == 1")
    } else {
      self.forest.push(TranslationNode::Alt { alternatives: candidates })
    }
  }

  /// Every node translating some completed derivation of `nonterm` spanning
  /// exactly `[start, end)`, memoized.
  fn nonterm_derivations(&mut self, nonterm: SymbolId, start: usize, end: usize) -> Vec<NodeId> {
    let key = (nonterm, start, end);
    if let Some(hit) = self.nonterm_cache.get(&key) {
      return hit.clone();
    }

    let mut rules: Vec<RuleId> = Vec::new();
    let mut seen: Set<RuleId> = Set::new();
    for item_rule in self.completed_items_ending_at(end, |item| item.lhs(self.g) == nonterm) {
      let (rule, origin) = item_rule;
      if origin == start && seen.insert(rule) {
        rules.push(rule);
      }
    }

    let mut out = Vec::new();
    for rule_id in rules {
      let rule = self.g.rule(rule_id).clone();
      let dot = rule.rhs.len();
      for children in self.rule_span_derivations(rule_id, dot, start, end) {
        out.push(self.apply_translation(&rule, children));
      }
    }
    self.nonterm_cache.insert(key, out.clone());
    out
  }

  /// Every way to assign `rhs[0..dot]` of `rule` across exactly `[start,
  /// end)`, as ordered child-node sequences, memoized.
  fn rule_span_derivations(&mut self, rule_id: RuleId, dot: usize, start: usize, end: usize) -> Vec<Vec<NodeId>> {
    let key = (rule_id, dot, start, end);
    if let Some(hit) = self.seq_cache.get(&key) {
      return hit.clone();
    }

    let out = if dot == 0 {
      if start == end {
        vec![Vec::new()]
      } else {
        Vec::new()
      }
    } else {
      let sym = self.g.rule(rule_id).rhs[dot - 1];
      let mut out = Vec::new();

      if Some(sym) == self.g.error_symbol() {
        // The `error` sentinel (spec §4.8) never appears in the real token
        // stream and its rhs slot can absorb more than one real token when
        // recovery's `(i, j)` search skips more than the one that failed to
        // scan. Try every split point: `mid` tokens precede the absorbed
        // span, the remaining `[mid, end)` tokens are the ones `error`
        // swallowed.
        for mid in start..end {
          let Some(tokens) = self.error_span_tokens(mid, end) else { continue };
          let leaf = if tokens.len() == 1 {
            tokens[0]
          } else {
            self.forest.push(TranslationNode::ErrorSpan { tokens })
          };
          for mut prefix in self.rule_span_derivations(rule_id, dot - 1, start, mid) {
            prefix.push(leaf);
            out.push(prefix);
          }
        }
      } else if self.g.symbol(sym).is_terminal() {
        if end > start {
          let mid = end - 1;
          if let Some(&(tok_sym, attr)) = self.parser.tokens().get(mid) {
            if tok_sym == sym {
              let leaf = self.terminal_node(tok_sym, attr);
              for mut prefix in self.rule_span_derivations(rule_id, dot - 1, start, mid) {
                prefix.push(leaf);
                out.push(prefix);
              }
            }
          }
        }
      } else {
        for mid in self.nonterm_origins_ending_at(sym, end) {
          if mid < start {
            continue;
          }
          let prefixes = self.rule_span_derivations(rule_id, dot - 1, start, mid);
          if prefixes.is_empty() {
            continue;
          }
          let child_candidates = self.nonterm_derivations(sym, mid, end);
          if child_candidates.is_empty() {
            continue;
          }
          let child = self.select(child_candidates);
          for mut prefix in prefixes {
            prefix.push(child);
            out.push(prefix);
          }
        }
      }
      out
    };

    self.seq_cache.insert(key, out.clone());
    out
  }

  /// Scans the set at `end`'s core for completed items satisfying
  /// `filter`, returning `(rule, origin)` pairs.
  fn completed_items_ending_at(&self, end: usize, filter: impl Fn(&crate::compile::item::Item) -> bool) -> Vec<(RuleId, usize)> {
    let set = self.parser.sets().get(self.parser.set_at(end)).clone();
    let core = self.parser.cores().get(set.core).clone();
    let mut out = Vec::new();
    for (idx, &item_id) in core.items.iter().enumerate() {
      let item = self.parser.items().get(item_id);
      if !item.is_complete(self.g) || !filter(&item) {
        continue;
      }
      let origin = if idx < core.n_start { end - set.distances[idx] as usize } else { end };
      out.push((item.rule, origin));
    }
    out
  }

  /// Distinct origins of completed derivations of `sym` ending at `end`,
  /// used to enumerate the split points a nonterminal-after-dot can
  /// legally sit at without blindly scanning every position in `[0, end)`.
  fn nonterm_origins_ending_at(&self, sym: SymbolId, end: usize) -> Vec<usize> {
    let mut origins = Vec::new();
    for (_, origin) in self.completed_items_ending_at(end, |item| item.lhs(self.g) == sym) {
      if !origins.contains(&origin) {
        origins.push(origin);
      }
    }
    origins
  }

  fn terminal_node(&mut self, symbol: SymbolId, attr: TokenAttr) -> NodeId {
    self.forest.push(TranslationNode::Terminal { symbol, attr })
  }

  /// Builds one `Terminal` node per real token in `[mid, end)`, in order,
  /// for an `error` rhs slot's absorbed span. `None` if any index in the
  /// span fell outside the actual token stream.
  fn error_span_tokens(&mut self, mid: usize, end: usize) -> Option<Vec<NodeId>> {
    (mid..end)
      .map(|i| self.parser.tokens().get(i).map(|&(sym, attr)| self.terminal_node(sym, attr)))
      .collect()
  }

  fn apply_translation(&mut self, rule: &Rule, children: Vec<NodeId>) -> NodeId {
    match &rule.translation {
      Translation::Forward(i) => children[*i],
      Translation::Anode { name, cost, children: picks } => {
        let picked: Vec<NodeId> = picks.iter().map(|&i| children[i]).collect();
        self.forest.push(TranslationNode::Anode { name: name.clone(), cost: *cost, children: picked })
      }
    }
  }
}
