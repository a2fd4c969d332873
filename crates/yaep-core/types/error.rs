//! Error kinds and the stable integer error-code surface (spec §6, §7).

use std::cell::RefCell;

/// Stable integer error codes exposed across the external interface (spec
/// §6). Kept as a separate, `Copy` enum from [`YaepError`] so that callers
/// across an FFI-style boundary can match on a small closed set without
/// pulling in the error's (possibly heap-allocated) message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
  NoMemory,
  UndefinedOrBadGrammar,
  DescriptionSyntaxError,
  FixedNameTermCode,
  RepeatedTermCode,
  NegativeTermCode,
  RepeatedTerm,
  UndefinedSymbol,
  UndefinedRuleLHS,
  RepeatedTerminalRule,
  IncorrectTranslation,
  NegativeCost,
  IncorrectSymbolNumber,
  RepeatedSymbolCode,
  GrammarAlreadyRead,
  DescriptionParseError,
  InvalidTokenCode,
  ParseError,
}

/// Construction, preparation, parse, and resource errors.
///
/// Propagation policy (spec §7): construction errors are returned at the
/// call that introduced the offense, preparation errors from `prepare`,
/// parse errors from `parse`. Every variant also updates the thread-local
/// diagnostic slot read by [`last_error_code`]/[`last_error_message`].
#[derive(Debug, thiserror::Error, Clone)]
pub enum YaepError {
  #[error("terminal '{0}' was declared more than once")]
  RepeatedTerm(String),

  #[error("terminal code {0} is used by more than one terminal")]
  RepeatedTermCode(i32),

  #[error("terminal codes must be non-negative, got {0}")]
  NegativeTermCode(i32),

  #[error("nonterminal '{0}' is referenced but never defined")]
  UndefinedNonterminal(String),

  #[error("symbol '{0}' was never declared as a terminal or given a rule")]
  UndefinedSymbol(String),

  #[error("start symbol '{0}' was never defined")]
  InvalidStart(String),

  #[error("grammar contains no rules")]
  EmptyGrammar,

  #[error("rule for '{lhs}' names rhs position {index} but the rule has only {len} symbols")]
  IncorrectTranslation { lhs: String, index: usize, len: usize },

  #[error("'{0}' is declared as a terminal and cannot also be used as a rule's left-hand side")]
  RepeatedTerminalRule(String),

  #[error("abstract-node cost must be non-negative, got {0}")]
  NegativeCost(i64),

  #[error("grammar is unprepared, malformed, or its start symbol is unproductive")]
  UndefinedOrBadGrammar,

  #[error("prepare() was already called on this grammar")]
  GrammarAlreadyRead,

  #[error("description syntax error at {pos}: {msg}")]
  DescriptionSyntaxError { pos: usize, msg: String },

  #[error("token stream produced terminal code {0}, which is not registered to any terminal")]
  InvalidTokenCode(i32),

  #[error("scan failed at token position {position} and error recovery is disabled or exhausted")]
  ParseError { position: usize },
}

impl YaepError {
  /// Maps this error onto the stable integer code surface of spec §6.
  pub fn code(&self) -> ErrorCode {
    use YaepError::*;
    match self {
      RepeatedTerm(_) => ErrorCode::RepeatedTerm,
      RepeatedTermCode(_) => ErrorCode::RepeatedTermCode,
      NegativeTermCode(_) => ErrorCode::NegativeTermCode,
      UndefinedNonterminal(_) => ErrorCode::UndefinedRuleLHS,
      UndefinedSymbol(_) => ErrorCode::UndefinedSymbol,
      InvalidStart(_) => ErrorCode::UndefinedOrBadGrammar,
      EmptyGrammar => ErrorCode::UndefinedOrBadGrammar,
      IncorrectTranslation { .. } => ErrorCode::IncorrectTranslation,
      RepeatedTerminalRule(_) => ErrorCode::RepeatedTerminalRule,
      NegativeCost(_) => ErrorCode::NegativeCost,
      UndefinedOrBadGrammar => ErrorCode::UndefinedOrBadGrammar,
      GrammarAlreadyRead => ErrorCode::GrammarAlreadyRead,
      DescriptionSyntaxError { .. } => ErrorCode::DescriptionSyntaxError,
      InvalidTokenCode(_) => ErrorCode::InvalidTokenCode,
      ParseError { .. } => ErrorCode::ParseError,
    }
  }

  /// Records this error in the thread-local diagnostic slot and returns it
  /// unchanged, so it can be chained with `?` at the raise site.
  pub fn record(self) -> Self {
    LAST_ERROR.with(|slot| {
      *slot.borrow_mut() = Some((self.code(), self.to_string()));
    });
    self
  }
}

thread_local! {
  static LAST_ERROR: RefCell<Option<(ErrorCode, String)>> = RefCell::new(None);
}

/// The code of the most recently raised [`YaepError`] on this thread, or
/// `None` if no error has occurred yet. The diagnostic slot is only ever
/// updated when an error actually occurs (spec §7).
pub fn last_error_code() -> Option<ErrorCode> {
  LAST_ERROR.with(|slot| slot.borrow().as_ref().map(|(c, _)| *c))
}

/// The message of the most recently raised [`YaepError`] on this thread.
pub fn last_error_message() -> Option<String> {
  LAST_ERROR.with(|slot| slot.borrow().as_ref().map(|(_, m)| m.clone()))
}
