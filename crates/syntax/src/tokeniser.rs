use crate::span::Span;
use std::{fmt, iter};

/// Convert the inside of a mustache (`{{ ... }}`) into an [Iterator] of [Token]s
///
/// Starts lexing at a given byte offset of the source, and yields tokens up to and
/// including the closing `}}`. Offsets in the tokens are relative to the whole source.
pub struct Tokeniser<'source> {
  /// The source code to tokenise
  source: &'source [u8],
  /// The current position in the source code
  position: usize,
  /// Has the closing delimiter or the end of the file been reached?
  finished: bool,
}
impl<'source> Tokeniser<'source> {
  /// Create a new [Tokeniser] starting at a byte offset of a source code string
  ///
  /// # Panics
  /// Panics if the length of the source code is greater than `u32::MAX`
  pub fn new(source: &'source str, position: usize) -> Self {
    assert!(source.len() < u32::MAX as usize);

    Self {
      source: source.as_bytes(),
      position,
      finished: false,
    }
  }

  /// Has the end of the source code been reached?
  fn is_end(&self, position: usize) -> bool {
    position >= self.source.len()
  }

  /// Get the next token from the source code
  fn get_next_token(&mut self) -> (TokenKind, usize) {
    if self.is_end(self.position) {
      return (TokenKind::EndOfFile, 0);
    }

    let character = &self.source[self.position];
    let next_character = self.source.get(self.position + 1);

    match character {
      // Whitespace
      b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' => {
        self.position += 1;
        self.get_next_token()
      }

      // Delimiters
      b'}' if matches!(next_character, Some(b'}')) => (TokenKind::Close, 2),
      b'~' => (TokenKind::Tilde, 1),
      b'(' => (TokenKind::LeftParen, 1),
      b')' => (TokenKind::RightParen, 1),
      b'=' => (TokenKind::Equal, 1),
      b'|' => (TokenKind::Pipe, 1),

      // Values
      quote @ (b'"' | b'\'') => self.string(*quote),
      b'-' if matches!(next_character, Some(b'0'..=b'9')) => self.number(),
      b'0'..=b'9' => self.number(),
      b'@' | b'.' | b'[' => self.path(),
      x if is_identifier_character(*x) => self.path(),

      // Unknown character
      x if (x & 0b1111_0000) == 0b1111_0000 => (TokenKind::Unknown, 4),
      x if (x & 0b1110_0000) == 0b1110_0000 => (TokenKind::Unknown, 3),
      x if (x & 0b1100_0000) == 0b1100_0000 => (TokenKind::Unknown, 2),
      _ => (TokenKind::Unknown, 1),
    }
  }

  /// Go to the end of a string token, the closing quote
  ///
  /// A backslash escapes the quote character.
  fn string(&self, quote: u8) -> (TokenKind, usize) {
    let mut pos = self.position + 1;

    loop {
      if self.is_end(pos) {
        break (TokenKind::UnterminatedString, pos - self.position);
      } else if self.source[pos] == b'\\' && self.source.get(pos + 1) == Some(&quote) {
        pos += 2;
        continue;
      } else if self.source[pos] == quote {
        break (TokenKind::String, pos - self.position + 1);
      }

      pos += 1;
    }
  }

  /// Get a number token, with a possible sign and decimal part
  ///
  /// If the digits run straight into identifier characters it is a path instead (e.g. `1st`)
  fn number(&self) -> (TokenKind, usize) {
    let mut position = self.position + 1;

    // Match numbers before the decimal point
    position += self.source[position..]
      .iter()
      .take_while(|c| c.is_ascii_digit())
      .count();

    // Match a decimal point
    if !self.is_end(position + 1)
      && self.source[position] == b'.'
      && self.source[position + 1].is_ascii_digit()
    {
      position += 1;

      // Match numbers after the decimal point
      position += self.source[position..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    }

    match self.source.get(position) {
      None | Some(b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' | b'}' | b')' | b'~' | b'|' | b'=') => {
        (TokenKind::Number, position - self.position)
      }
      Some(_) => self.path(),
    }
  }

  /// Get a path token: segments separated by `.` or `/`, with an optional `@` prefix
  ///
  /// Segments are identifiers, `..`, `.`, or `[literal segments]`.
  fn path(&self) -> (TokenKind, usize) {
    let mut position = self.position;
    if self.source[position] == b'@' {
      position += 1;
    }

    loop {
      let segment_start = position;

      if self.source[position..].starts_with(b"..") {
        position += 2;
      } else if self.source.get(position) == Some(&b'.') {
        position += 1;
      } else if self.source.get(position) == Some(&b'[') {
        match self.source[position..].iter().position(|c| *c == b']') {
          Some(end) => position += end + 1,
          None => return (TokenKind::UnterminatedSegment, self.source.len() - self.position),
        }
      } else {
        position += self.source[position..]
          .iter()
          .take_while(|c| is_identifier_character(**c))
          .count();
      }

      if position == segment_start {
        break;
      }

      let separator = self.source.get(position);
      let after_separator = self.source.get(position + 1);
      if matches!(separator, Some(b'.' | b'/'))
        && after_separator.is_some_and(|c| matches!(c, b'.' | b'[') || is_identifier_character(*c))
      {
        position += 1;
      } else {
        break;
      }
    }

    let length = (position - self.position).max(1);
    (self.path_type(length), length)
  }

  /// Determines the type of the path, is it a keyword literal or a standard path
  fn path_type(&self, length: usize) -> TokenKind {
    match &self.source[self.position..self.position + length] {
      b"true" => TokenKind::True,
      b"false" => TokenKind::False,
      b"null" => TokenKind::Null,
      b"undefined" => TokenKind::Undefined,
      _ => TokenKind::Path,
    }
  }
}
impl Iterator for Tokeniser<'_> {
  type Item = Token;

  fn next(&mut self) -> Option<Self::Item> {
    if self.finished {
      return None;
    }

    let (kind, len) = self.get_next_token();
    let start = self.position;
    self.position += len;
    self.finished = matches!(kind, TokenKind::Close | TokenKind::EndOfFile);

    Some(Token {
      kind,
      start: u32::try_from(start).unwrap_or(u32::MAX),
      length: u32::try_from(len).unwrap_or(u32::MAX),
    })
  }
}
impl iter::FusedIterator for Tokeniser<'_> {}

/// Can the byte appear within an identifier segment of a path?
///
/// Anything apart from whitespace and the characters reserved by the template syntax,
/// so non-ASCII characters are allowed.
fn is_identifier_character(character: u8) -> bool {
  !matches!(
    character,
    b' '
      | b'\t'
      | b'\n'
      | b'\r'
      | b'\x0C'
      | b'!'
      | b'"'
      | b'#'
      | b'%'..=b','
      | b'.'
      | b'/'
      | b';'..=b'>'
      | b'@'
      | b'['..=b'^'
      | b'`'
      | b'{'..=b'~'
  )
}

/// A Token from inside a mustache, a lexeme of the expression syntax
///
/// With the type of token, start position and length of the token in the source code
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Token {
  /// The type of token
  pub kind: TokenKind,
  /// The byte offset of the start of the token
  pub start: u32,
  /// The length of the token in bytes
  pub length: u32,
}
impl Token {
  /// The byte offset just after the token
  #[must_use]
  pub fn end(self) -> u32 {
    self.start + self.length
  }
}
impl From<Token> for Span {
  fn from(token: Token) -> Self {
    Self {
      start: token.start,
      end: token.end(),
    }
  }
}

/// The type of a token
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub enum TokenKind {
  // Delimiters
  /// `}}`
  Close,
  /// `~`
  Tilde,
  /// `(`
  LeftParen,
  /// `)`
  RightParen,
  /// `=`
  Equal,
  /// `|`
  Pipe,

  // Values
  /// A path, such as `name`, `this.name`, `../name`, `@index`, or `name/[other]`
  Path,
  /// A number, with possible sign and decimal part
  Number,
  /// A string, any characters between `'` or `"`
  String,

  // Keywords
  /// `true`
  True,
  /// `false`
  False,
  /// `null`
  Null,
  /// `undefined`
  Undefined,

  /// A token to indicate the end of the file
  EndOfFile,

  // Error
  /// An unknown character, not known to fit in a [`TokenKind`]
  #[default]
  Unknown,
  /// A string where the end of the file has been reached, thus unterminated
  UnterminatedString,
  /// A `[literal segment]` which is never closed
  UnterminatedSegment,
}
impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      // Delimiters
      Self::Close => write!(f, "}}}}"),
      Self::Tilde => write!(f, "~"),
      Self::LeftParen => write!(f, "("),
      Self::RightParen => write!(f, ")"),
      Self::Equal => write!(f, "="),
      Self::Pipe => write!(f, "|"),

      // With Values
      Self::Path => write!(f, "Path"),
      Self::Number => write!(f, "Number"),
      Self::String => write!(f, "String"),

      // Keywords
      Self::True => write!(f, "true"),
      Self::False => write!(f, "false"),
      Self::Null => write!(f, "null"),
      Self::Undefined => write!(f, "undefined"),

      Self::EndOfFile => write!(f, "End of File"),

      // Errors
      Self::Unknown => write!(f, "Unknown Character"),
      Self::UnterminatedString => write!(f, "Unterminated String"),
      Self::UnterminatedSegment => write!(f, "Unterminated Segment"),
    }
  }
}
