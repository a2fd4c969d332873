//! Hand-written scanner for the grammar description format (spec §6.2):
//! `TERM name [code] (',' name [code])* ';'`, `lhs ':' alt ('|' alt)* ';'`,
//! `'#' translation`, and single-quoted character-literal terminals.

use yaep_core::YaepError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tok {
  Term,
  Ident(String),
  Int(i64),
  /// A single-quoted character literal, carrying its codepoint as the
  /// terminal code and its source spelling for naming.
  CharLit(i32, String),
  Colon,
  Bar,
  Semi,
  Comma,
  Hash,
  LParen,
  RParen,
  Eof,
}

pub struct Lexer<'a> {
  src: &'a [u8],
  pos: usize,
}

impl<'a> Lexer<'a> {
  pub fn new(src: &'a str) -> Self {
    Lexer { src: src.as_bytes(), pos: 0 }
  }

  fn peek(&self) -> Option<u8> {
    self.src.get(self.pos).copied()
  }

  fn bump(&mut self) -> Option<u8> {
    let c = self.peek();
    if c.is_some() {
      self.pos += 1;
    }
    c
  }

  fn skip_ws_and_comments(&mut self) {
    loop {
      while let Some(c) = self.peek() {
        if c.is_ascii_whitespace() {
          self.pos += 1;
        } else {
          break;
        }
      }
      if self.peek() == Some(b'/') && self.src.get(self.pos + 1) == Some(&b'/') {
        while let Some(c) = self.peek() {
          if c == b'\n' {
            break;
          }
          self.pos += 1;
        }
        continue;
      }
      break;
    }
  }

  /// Returns the next token and the byte offset it started at.
  pub fn next_token(&mut self) -> Result<(Tok, usize), YaepError> {
    self.skip_ws_and_comments();
    let start = self.pos;
    let Some(c) = self.peek() else { return Ok((Tok::Eof, start)) };

    let tok = match c {
      b':' => {
        self.bump();
        Tok::Colon
      }
      b'|' => {
        self.bump();
        Tok::Bar
      }
      b';' => {
        self.bump();
        Tok::Semi
      }
      b',' => {
        self.bump();
        Tok::Comma
      }
      b'#' => {
        self.bump();
        Tok::Hash
      }
      b'(' => {
        self.bump();
        Tok::LParen
      }
      b')' => {
        self.bump();
        Tok::RParen
      }
      b'\'' => self.char_literal(start)?,
      b'0'..=b'9' => self.integer(),
      c if c == b'_' || c.is_ascii_alphabetic() => self.ident_or_keyword(),
      other => {
        return Err(
          YaepError::DescriptionSyntaxError { pos: start, msg: format!("unexpected character '{}'", other as char) }
            .record(),
        )
      }
    };
    Ok((tok, start))
  }

  fn integer(&mut self) -> Tok {
    let start = self.pos;
    while let Some(c) = self.peek() {
      if c.is_ascii_digit() {
        self.pos += 1;
      } else {
        break;
      }
    }
    let s = std::str::from_utf8(&self.src[start..self.pos]).expect("ascii digits");
    Tok::Int(s.parse().expect("digit run parses as i64"))
  }

  fn ident_or_keyword(&mut self) -> Tok {
    let start = self.pos;
    while let Some(c) = self.peek() {
      if c == b'_' || c.is_ascii_alphanumeric() {
        self.pos += 1;
      } else {
        break;
      }
    }
    let s = std::str::from_utf8(&self.src[start..self.pos]).expect("ascii ident").to_string();
    if s == "TERM" {
      Tok::Term
    } else {
      Tok::Ident(s)
    }
  }

  fn char_literal(&mut self, start: usize) -> Result<Tok, YaepError> {
    self.bump(); // opening quote
    let ch = match self.bump() {
      Some(b'\\') => match self.bump() {
        Some(b'n') => '\n',
        Some(b't') => '\t',
        Some(b'0') => '\0',
        Some(b'\\') => '\\',
        Some(b'\'') => '\'',
        Some(other) => other as char,
        None => return Err(Self::unterminated(start)),
      },
      Some(c) => c as char,
      None => return Err(Self::unterminated(start)),
    };
    if self.bump() != Some(b'\'') {
      return Err(YaepError::DescriptionSyntaxError { pos: start, msg: "expected closing '\\''".into() }.record());
    }
    let spelling = format!("'{}'", ch);
    Ok(Tok::CharLit(ch as i32, spelling))
  }

  fn unterminated(start: usize) -> YaepError {
    YaepError::DescriptionSyntaxError { pos: start, msg: "unterminated character literal".into() }.record()
  }
}
