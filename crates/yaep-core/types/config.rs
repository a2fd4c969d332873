//! Grammar/parse configuration (spec §6), modeled on the teacher's
//! `ParserConfig` chained-builder style.

/// Settings that control how a [`crate::Grammar`] is analyzed and how
/// [`crate::Parser::parse`] resolves ambiguity and failure.
#[derive(Debug, Clone, Copy)]
pub struct GrammarConfig {
  /// Depth of the lookahead context computed per item: `0`, `1`, or `2`.
  /// Deeper lookahead prunes more dead predictions but costs more to
  /// compute; `0` disables the lookahead filter entirely (still correct,
  /// only slower).
  pub lookahead_level: u8,
  /// When set, the translator selects a single derivation instead of
  /// building a shared packed forest.
  pub one_parse: bool,
  /// When set (and `one_parse` is set), the selected derivation is the one
  /// minimizing summed abstract-node cost rather than the first found.
  pub cost: bool,
  /// When set, a scan failure triggers minimal-cost error recovery (spec
  /// §4.8) instead of immediately failing the parse.
  pub error_recovery: bool,
  /// Number of lookahead tokens that must successfully scan from a
  /// candidate recovery state before it is accepted.
  pub recovery_token_matches: u32,
  /// When unset, `complete_against` never consults or populates the Leo
  /// table: every completion walks its full waiter chain. Exists so the
  /// spec's Leo-correctness property (identical parses with the
  /// optimization on or off) can be exercised directly; production callers
  /// should leave this set.
  pub leo_enabled: bool,
  /// When unset, the transition cache is never consulted or populated:
  /// every scan recomputes the predict/scan/complete closure. Exists for
  /// the same reason as `leo_enabled`, mirrored for the transition-cache
  /// correctness property.
  pub transition_cache_enabled: bool,
}

impl Default for GrammarConfig {
  fn default() -> Self {
    Self {
      lookahead_level: 1,
      one_parse: true,
      cost: false,
      error_recovery: false,
      recovery_token_matches: 3,
      leo_enabled: true,
      transition_cache_enabled: true,
    }
  }
}

impl GrammarConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set_lookahead_level(mut self, l: u8) -> Self {
    debug_assert!(l <= 2, "lookahead level must be 0, 1, or 2");
    self.lookahead_level = l;
    self
  }

  pub fn set_one_parse(mut self, enable: bool) -> Self {
    self.one_parse = enable;
    self
  }

  pub fn set_cost(mut self, enable: bool) -> Self {
    self.cost = enable;
    self
  }

  pub fn set_error_recovery(mut self, enable: bool) -> Self {
    self.error_recovery = enable;
    self
  }

  pub fn set_recovery_token_matches(mut self, n: u32) -> Self {
    self.recovery_token_matches = n;
    self
  }

  pub fn set_leo_enabled(mut self, enable: bool) -> Self {
    self.leo_enabled = enable;
    self
  }

  pub fn set_transition_cache_enabled(mut self, enable: bool) -> Self {
    self.transition_cache_enabled = enable;
    self
  }
}
