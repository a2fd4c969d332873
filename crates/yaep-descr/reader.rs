//! Recursive-descent reader that drives [`yaep_core::GrammarBuilder`] from a
//! textual description (spec §6.2), the same way an external caller would
//! through the programmatic API.

use std::collections::HashMap;

use yaep_core::{GrammarBuilder, Translation, YaepError};

use crate::lexer::{Lexer, Tok};

/// Parses `src` and returns a [`GrammarBuilder`] with every `TERM`
/// declaration and rule applied, plus `set_start` already called on the
/// left-hand side of the first rule (the description format has no
/// explicit start directive, so the first rule's lhs is taken as the
/// convention, matching common YACC-derived tooling). Callers may still
/// override it with their own `set_start` before `prepare()`.
pub fn read_grammar(src: &str) -> Result<GrammarBuilder, YaepError> {
  Reader::new(src)?.run()
}

struct Reader<'a> {
  lexer: Lexer<'a>,
  cur: Tok,
  cur_pos: usize,
  builder: GrammarBuilder,
  /// Terminal codes already handed to `add_terminal`, explicit or
  /// auto-assigned, so the next auto-assignment skips them.
  used_codes: std::collections::HashSet<i32>,
  next_auto_code: i32,
  /// Char-literal terminals already declared, keyed by codepoint, so the
  /// same literal reused across rules resolves to one terminal.
  char_terminals: HashMap<i32, String>,
  start: Option<String>,
}

impl<'a> Reader<'a> {
  fn new(src: &'a str) -> Result<Self, YaepError> {
    let mut lexer = Lexer::new(src);
    let (cur, cur_pos) = lexer.next_token()?;
    Ok(Reader {
      lexer,
      cur,
      cur_pos,
      builder: GrammarBuilder::new(),
      used_codes: std::collections::HashSet::new(),
      next_auto_code: 0,
      char_terminals: HashMap::new(),
      start: None,
    })
  }

  fn advance(&mut self) -> Result<(), YaepError> {
    let (t, p) = self.lexer.next_token()?;
    self.cur = t;
    self.cur_pos = p;
    Ok(())
  }

  fn err(&self, msg: impl Into<String>) -> YaepError {
    YaepError::DescriptionSyntaxError { pos: self.cur_pos, msg: msg.into() }.record()
  }

  fn expect_ident(&mut self) -> Result<String, YaepError> {
    match self.cur.clone() {
      Tok::Ident(s) => {
        self.advance()?;
        Ok(s)
      }
      other => Err(self.err(format!("expected an identifier, found {:?}", other))),
    }
  }

  fn expect(&mut self, want: &Tok) -> Result<(), YaepError> {
    if &self.cur != want {
      return Err(self.err(format!("expected {:?}, found {:?}", want, self.cur)));
    }
    self.advance()
  }

  fn run(mut self) -> Result<GrammarBuilder, YaepError> {
    while self.cur != Tok::Eof {
      if self.cur == Tok::Term {
        self.term_decl()?;
      } else {
        self.rule()?;
      }
    }
    if let Some(start) = self.start.take() {
      log::debug!("using '{start}' as the start symbol (lhs of the first rule)");
      self.builder = std::mem::take(&mut self.builder).set_start(&start);
    }
    Ok(self.builder)
  }

  /// `TERM name [code] (',' name [code])* ';'`
  fn term_decl(&mut self) -> Result<(), YaepError> {
    self.advance()?; // consume TERM
    loop {
      let name = self.expect_ident()?;
      let code = if let Tok::Int(n) = self.cur {
        self.advance()?;
        n as i32
      } else {
        self.auto_code()
      };
      self.used_codes.insert(code);
      self.builder = std::mem::take(&mut self.builder).add_terminal(&name, code)?;
      if self.cur == Tok::Comma {
        self.advance()?;
        continue;
      }
      break;
    }
    self.expect(&Tok::Semi)
  }

  fn auto_code(&mut self) -> i32 {
    loop {
      let c = self.next_auto_code;
      self.next_auto_code += 1;
      if self.used_codes.insert(c) {
        return c;
      }
    }
  }

  /// `lhs ':' alt ('|' alt)* ';'`
  fn rule(&mut self) -> Result<(), YaepError> {
    let lhs = self.expect_ident()?;
    if self.start.is_none() {
      self.start = Some(lhs.clone());
    }
    self.expect(&Tok::Colon)?;
    loop {
      self.alt(&lhs)?;
      if self.cur == Tok::Bar {
        self.advance()?;
        continue;
      }
      break;
    }
    self.expect(&Tok::Semi)
  }

  /// `rhs_symbol* ('#' translation)?`
  fn alt(&mut self, lhs: &str) -> Result<(), YaepError> {
    let mut rhs: Vec<String> = Vec::new();
    loop {
      match self.cur.clone() {
        Tok::Ident(name) => {
          rhs.push(name);
          self.advance()?;
        }
        Tok::CharLit(code, spelling) => {
          self.ensure_char_terminal(code, &spelling)?;
          rhs.push(spelling);
          self.advance()?;
        }
        _ => break,
      }
    }

    let translation = if self.cur == Tok::Hash {
      self.advance()?;
      self.translation(rhs.len())?
    } else if rhs.is_empty() {
      return Err(self.err("an empty production must carry an explicit '#' translation"));
    } else {
      Translation::forward(0)
    };

    let rhs_refs: Vec<&str> = rhs.iter().map(String::as_str).collect();
    self.builder = std::mem::take(&mut self.builder).add_rule(lhs, &rhs_refs, translation)?;
    Ok(())
  }

  fn ensure_char_terminal(&mut self, code: i32, spelling: &str) -> Result<(), YaepError> {
    if self.char_terminals.contains_key(&code) {
      return Ok(());
    }
    self.used_codes.insert(code);
    self.builder = std::mem::take(&mut self.builder).add_terminal(spelling, code)?;
    self.char_terminals.insert(code, spelling.to_string());
    Ok(())
  }

  /// `translation := integer | name '(' integer* ')'`. Out-of-range indices
  /// are left for `GrammarBuilder::add_rule` to reject as
  /// `IncorrectTranslation`, which already carries the rule's rhs length.
  fn translation(&mut self, _rhs_len: usize) -> Result<Translation, YaepError> {
    match self.cur.clone() {
      Tok::Int(i) => {
        self.advance()?;
        if i < 0 {
          return Err(self.err(format!("translation index must be non-negative, got {i}")));
        }
        Ok(Translation::forward(i as usize))
      }
      Tok::Ident(name) => {
        self.advance()?;
        self.expect(&Tok::LParen)?;
        let mut children = Vec::new();
        while let Tok::Int(i) = self.cur {
          children.push(i as usize);
          self.advance()?;
        }
        self.expect(&Tok::RParen)?;
        Ok(Translation::anode(name, 0, &children))
      }
      ref other => Err(self.err(format!("expected a translation (integer or name(...)), found {:?}", other))),
    }
  }
}
