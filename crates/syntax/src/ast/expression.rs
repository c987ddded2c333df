//! # Expressions
//!
//! The values which appear inside of mustaches: paths, literals, and sub-expressions.

use crate::span::Span;
use std::fmt;
use thin_vec::ThinVec;

/// An expression inside of a mustache, e.g. `name`, `"text"`, `(helper arg)`
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
  /// A path to a value, e.g. `this.name`, `../parent`, `@index`
  Path(PathExpression),
  /// A nested helper call, e.g. `(concat a b)`
  SubExpression(Box<SubExpression>),
  /// A string literal, e.g. `"text"`, `'text'`
  String(StringLiteral),
  /// A number literal, e.g. `1`, `-2.5`
  Number(NumberLiteral),
  /// A boolean literal, `true` or `false`
  Boolean(BooleanLiteral),
  /// The `null` literal
  Null(NullLiteral),
  /// The `undefined` literal
  Undefined(UndefinedLiteral),
}
impl Expression {
  /// The location of the expression
  pub fn span(&self) -> Span {
    match self {
      Self::Path(path) => path.span,
      Self::SubExpression(sub_expression) => sub_expression.span,
      Self::String(string) => string.span,
      Self::Number(number) => number.span,
      Self::Boolean(boolean) => boolean.span,
      Self::Null(null) => null.span,
      Self::Undefined(undefined) => undefined.span,
    }
  }

  /// The name of the kind of expression, used in tree views and error messages
  #[must_use]
  pub const fn kind(&self) -> &'static str {
    match self {
      Self::Path(_) => "PathExpression",
      Self::SubExpression(_) => "SubExpression",
      Self::String(_) => "StringLiteral",
      Self::Number(_) => "NumberLiteral",
      Self::Boolean(_) => "BooleanLiteral",
      Self::Null(_) => "NullLiteral",
      Self::Undefined(_) => "UndefinedLiteral",
    }
  }
}

/// A path to a value, split into its segments
///
/// The spelling used in the source is kept in `original`. Mixed separators and
/// parent references (`../x`, `this/x`) are accepted as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpression {
  /// The path as written in the source
  pub original: String,
  /// The segments of the path, split on `.` and `/`
  pub parts: ThinVec<String>,
  /// The location of the path
  pub span: Span,
}
impl PathExpression {
  /// Create a path from its source spelling
  pub fn new(original: &str, span: Span) -> Self {
    Self {
      original: original.to_owned(),
      parts: split_path(original),
      span,
    }
  }

  /// The first segment of the path, the helper name for a helper call
  #[must_use]
  pub fn head(&self) -> &str {
    self.parts.first().map_or("", String::as_str)
  }
}
impl fmt::Display for PathExpression {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.original)
  }
}

/// Split a path into segments, keeping `[literal segments]` whole
fn split_path(original: &str) -> ThinVec<String> {
  let mut parts = ThinVec::new();
  let mut current = String::new();
  let mut in_literal = false;

  for character in original.chars() {
    match character {
      '[' if !in_literal => in_literal = true,
      ']' if in_literal => in_literal = false,
      '.' | '/' if !in_literal => {
        if !current.is_empty() {
          parts.push(std::mem::take(&mut current));
        }
      }
      character => current.push(character),
    }
  }
  if !current.is_empty() {
    parts.push(current);
  }

  parts
}

/// A helper call inside of parentheses, e.g. `(concat a b key=value)`
#[derive(Debug, Clone, PartialEq)]
pub struct SubExpression {
  /// The helper being called
  pub path: Expression,
  /// Positional arguments
  pub params: ThinVec<Expression>,
  /// Named arguments
  pub hash: Hash,
  /// The location of the sub-expression, including the parentheses
  pub span: Span,
}

/// Named arguments, e.g. `key=value other=(helper)`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hash {
  /// The key-value pairs, in source order
  pub pairs: ThinVec<HashPair>,
  /// The location of all the pairs
  pub span: Span,
}
impl Hash {
  /// Are there no named arguments?
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.pairs.is_empty()
  }
}

/// A single named argument, e.g. `key=value`
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
  /// The name of the argument
  pub key: String,
  /// The value of the argument
  pub value: Expression,
  /// The location of the pair
  pub span: Span,
}

/// A string literal, with the escapes removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
  /// The contents of the string
  pub value: String,
  /// The location of the string, including the quotes
  pub span: Span,
}

/// A number literal
#[derive(Debug, Clone, PartialEq)]
pub struct NumberLiteral {
  /// The value of the number
  pub value: f64,
  /// The location of the number
  pub span: Span,
}

/// A boolean literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanLiteral {
  /// The value of the boolean
  pub value: bool,
  /// The location of the boolean
  pub span: Span,
}

/// The `null` literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullLiteral {
  /// The location of the literal
  pub span: Span,
}

/// The `undefined` literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedLiteral {
  /// The location of the literal
  pub span: Span,
}
