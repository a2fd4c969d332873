//! Grammar assembly and preparation (spec §4.1): the symbol table, rule
//! store, and the fixed-point analyses that must run once before parsing.

pub mod analyzer;
pub mod termset;

use crate::types::{
  config::GrammarConfig,
  error::YaepError,
  rule::{Rule, RuleId, Translation},
  symbol::{Symbol, SymbolId, SymbolKind},
  Array, Map, OrderedMap,
};
use termset::TermSet;

/// The reserved terminal code used internally for the end-of-input marker.
/// Chosen well outside the range of ordinary user terminal codes.
pub const EOF_CODE: i32 = i32::MIN;

/// The reserved terminal code for the `error` recovery symbol (spec §4.8,
/// §6). User terminal codes must be non-negative, so this is unambiguous.
pub const ERROR_CODE: i32 = i32::MIN + 1;

/// A fully analyzed, immutable grammar, ready to be parsed against. Shared
/// (optionally via `Arc`) across any number of concurrent [`crate::Parser`]s
/// (spec §5): nothing here is mutated after [`GrammarBuilder::prepare`]
/// returns.
#[derive(Debug, Clone)]
pub struct Grammar {
  pub(crate) symbols: Array<Symbol>,
  pub(crate) rules: Array<Rule>,
  pub(crate) name_to_symbol: OrderedMap<String, SymbolId>,
  pub(crate) terminal_by_code: Map<i32, SymbolId>,
  pub(crate) start: SymbolId,
  /// The augmented start rule `S' → S`, whose unique completed item at
  /// position 0..n is the recognition's success condition.
  pub(crate) augmented_start: RuleId,
  pub(crate) augmented_start_symbol: SymbolId,
  pub(crate) eof: SymbolId,
  pub(crate) error_symbol: Option<SymbolId>,
  pub(crate) first_sets: Array<TermSet>,
  pub config: GrammarConfig,
}

impl Grammar {
  pub fn symbol(&self, id: SymbolId) -> &Symbol {
    &self.symbols[id.index()]
  }

  pub fn rule(&self, id: RuleId) -> &Rule {
    &self.rules[id.index()]
  }

  pub fn rules(&self) -> &[Rule] {
    &self.rules
  }

  pub fn symbols(&self) -> &[Symbol] {
    &self.symbols
  }

  pub fn start(&self) -> SymbolId {
    self.start
  }

  pub fn eof(&self) -> SymbolId {
    self.eof
  }

  pub fn error_symbol(&self) -> Option<SymbolId> {
    self.error_symbol
  }

  pub fn symbol_by_name(&self, name: &str) -> Option<SymbolId> {
    self.name_to_symbol.get(name).copied()
  }

  pub fn symbol_by_code(&self, code: i32) -> Option<SymbolId> {
    self.terminal_by_code.get(&code).copied()
  }

  pub fn first_set(&self, sym: SymbolId) -> &TermSet {
    &self.first_sets[sym.index()]
  }

  pub fn is_nullable(&self, sym: SymbolId) -> bool {
    self.symbol(sym).nullable()
  }
}

/// Consuming builder for grammar construction (spec §4.1, §6). Mirrors the
/// teacher's `ParserConfig` chained-method style.
pub struct GrammarBuilder {
  symbols: Array<Symbol>,
  rules: Array<Rule>,
  name_to_symbol: OrderedMap<String, SymbolId>,
  terminal_by_code: Map<i32, SymbolId>,
  start_name: Option<String>,
  config: GrammarConfig,
}

impl Default for GrammarBuilder {
  fn default() -> Self {
    Self::new()
  }
}

impl GrammarBuilder {
  pub fn new() -> Self {
    Self {
      symbols: Array::new(),
      rules: Array::new(),
      name_to_symbol: OrderedMap::new(),
      terminal_by_code: Map::new(),
      start_name: None,
      config: GrammarConfig::new(),
    }
  }

  pub fn set_lookahead_level(mut self, l: u8) -> Self {
    self.config = self.config.set_lookahead_level(l);
    self
  }

  pub fn set_one_parse(mut self, enable: bool) -> Self {
    self.config = self.config.set_one_parse(enable);
    self
  }

  pub fn set_cost(mut self, enable: bool) -> Self {
    self.config = self.config.set_cost(enable);
    self
  }

  pub fn set_error_recovery(mut self, enable: bool) -> Self {
    self.config = self.config.set_error_recovery(enable);
    self
  }

  pub fn set_recovery_token_matches(mut self, n: u32) -> Self {
    self.config = self.config.set_recovery_token_matches(n);
    self
  }

  pub fn set_leo_enabled(mut self, enable: bool) -> Self {
    self.config = self.config.set_leo_enabled(enable);
    self
  }

  pub fn set_transition_cache_enabled(mut self, enable: bool) -> Self {
    self.config = self.config.set_transition_cache_enabled(enable);
    self
  }

  /// Declares a terminal with a unique, caller-chosen integer code.
  pub fn add_terminal(mut self, name: &str, code: i32) -> Result<Self, YaepError> {
    self.declare_terminal(name, code)?;
    Ok(self)
  }

  fn declare_terminal(&mut self, name: &str, code: i32) -> Result<SymbolId, YaepError> {
    if code < 0 {
      return Err(YaepError::NegativeTermCode(code).record());
    }
    if self.terminal_by_code.contains_key(&code) {
      return Err(YaepError::RepeatedTermCode(code).record());
    }
    if self.name_to_symbol.contains_key(name) {
      return Err(YaepError::RepeatedTerm(name.to_string()).record());
    }
    let id = SymbolId::from(self.symbols.len());
    self.symbols.push(Symbol { id, name: name.to_string(), kind: SymbolKind::Terminal { code } });
    self.name_to_symbol.insert(name.to_string(), id);
    self.terminal_by_code.insert(code, id);
    Ok(id)
  }

  /// Returns the id for `name`, auto-creating it as a nonterminal on first
  /// mention (spec §4.1).
  fn intern_nonterminal(&mut self, name: &str) -> SymbolId {
    if let Some(&id) = self.name_to_symbol.get(name) {
      return id;
    }
    let id = SymbolId::from(self.symbols.len());
    self.symbols.push(Symbol {
      id,
      name: name.to_string(),
      kind: SymbolKind::Nonterminal { rules: Array::new(), nullable: false, accessible: false, productive: false },
    });
    self.name_to_symbol.insert(name.to_string(), id);
    id
  }

  /// Resolves `name` to an existing symbol (terminal or nonterminal),
  /// auto-creating a nonterminal if unseen. This is the single entry point
  /// rhs/lhs names go through, so that `add_rule` never distinguishes
  /// "new nonterminal" from "reference to a nonterminal declared earlier".
  fn resolve_symbol(&mut self, name: &str) -> SymbolId {
    self.intern_nonterminal(name)
  }

  /// Declares a production `lhs → rhs[0..] # translation`.
  pub fn add_rule(mut self, lhs_name: &str, rhs_names: &[&str], translation: Translation) -> Result<Self, YaepError> {
    self.declare_rule(lhs_name, rhs_names, translation)?;
    Ok(self)
  }

  fn declare_rule(&mut self, lhs_name: &str, rhs_names: &[&str], translation: Translation) -> Result<RuleId, YaepError> {
    let lhs = self.resolve_symbol(lhs_name);
    if self.symbols[lhs.index()].is_terminal() {
      return Err(YaepError::RepeatedTerminalRule(lhs_name.to_string()).record());
    }
    let rhs: Array<SymbolId> = rhs_names.iter().map(|n| self.resolve_symbol(n)).collect();

    let rhs_len = rhs.len();
    match &translation {
      Translation::Forward(i) if *i >= rhs_len => {
        return Err(
          YaepError::IncorrectTranslation { lhs: lhs_name.to_string(), index: *i, len: rhs_len }.record(),
        )
      }
      Translation::Anode { children, .. } => {
        for &c in children {
          if c >= rhs_len {
            return Err(
              YaepError::IncorrectTranslation { lhs: lhs_name.to_string(), index: c, len: rhs_len }.record(),
            );
          }
        }
      }
      _ => {}
    }

    let id = RuleId::from(self.rules.len());
    self.rules.push(Rule { id, lhs, rhs, translation });
    if let SymbolKind::Nonterminal { rules, .. } = &mut self.symbols[lhs.index()].kind {
      rules.push(id);
    }
    Ok(id)
  }

  pub fn set_start(mut self, name: &str) -> Self {
    self.start_name = Some(name.to_string());
    self
  }

  /// Runs the fixed-point analyses, builds the augmented start rule and the
  /// reserved `error`/eof symbols, and returns an immutable [`Grammar`].
  /// Idempotent only in the sense that it consumes `self`; it cannot be
  /// called twice on the same builder.
  pub fn prepare(mut self) -> Result<Grammar, YaepError> {
    if self.rules.is_empty() {
      return Err(YaepError::EmptyGrammar.record());
    }
    let start_name = self.start_name.clone().ok_or_else(|| YaepError::InvalidStart("<unset>".into()).record())?;
    let start = *self.name_to_symbol.get(&start_name).ok_or_else(|| YaepError::InvalidStart(start_name.clone()).record())?;
    if self.symbols[start.index()].is_terminal() {
      return Err(YaepError::InvalidStart(start_name).record());
    }

    // Reserved symbols: eof (a terminal, never produced by the caller's
    // token reader) and `error` (a terminal-like sentinel matched only by
    // error recovery, spec §4.8).
    let eof = self.declare_terminal("$eof", EOF_CODE)?;
    let error_symbol = if self.name_to_symbol.contains_key("error") {
      Some(self.name_to_symbol["error"])
    } else {
      None
    };
    // If `error` was mentioned as a bare rhs/lhs name it was auto-created as
    // a nonterminal by `resolve_symbol`; reserved-symbol semantics require
    // it behave as a terminal, so normalize it here.
    let error_symbol = error_symbol.map(|sym| {
      if self.symbols[sym.index()].is_nonterminal() {
        self.symbols[sym.index()].kind = SymbolKind::Terminal { code: ERROR_CODE };
        self.terminal_by_code.insert(ERROR_CODE, sym);
      }
      sym
    });

    // Augmented start rule `S' → S`, whose lookahead seed is {eof}.
    let augmented_start_symbol = self.intern_nonterminal("$start");
    let augmented_start = self.declare_rule("$start", &[&start_name], Translation::Forward(0))?;

    analyzer::analyze_fixed_points(&mut self.symbols, &self.rules, augmented_start_symbol);

    if !self.symbols[start.index()].productive() {
      return Err(YaepError::UndefinedOrBadGrammar.record());
    }

    // Every nonterminal mentioned on some rhs must have at least one rule
    // (checked only for the accessible portion, spec §4.1).
    for sym in &self.symbols {
      if sym.is_nonterminal() && sym.accessible() && sym.rules().is_empty() {
        return Err(YaepError::UndefinedNonterminal(sym.name.clone()).record());
      }
    }

    let first_sets = analyzer::compute_first_sets(&self.symbols, &self.rules);

    Ok(Grammar {
      symbols: self.symbols,
      rules: self.rules,
      name_to_symbol: self.name_to_symbol,
      terminal_by_code: self.terminal_by_code,
      start,
      augmented_start,
      augmented_start_symbol,
      eof,
      error_symbol,
      first_sets,
      config: self.config,
    })
  }
}
