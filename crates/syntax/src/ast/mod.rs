//! # AST
//!
//! The definition of the Abstract Syntax Tree (AST)

use crate::{LineIndex, parser::ParseError};
use std::cell::OnceCell;

pub mod expression;
mod prettyprint;
pub mod statement;

pub use expression::{
  BooleanLiteral, Expression, Hash, HashPair, NullLiteral, NumberLiteral, PathExpression,
  StringLiteral, SubExpression, UndefinedLiteral,
};
pub use statement::{
  AttrNode, AttrValue, BlockKind, BlockStatement, CommentStatement, ConcatPart, ConcatStatement,
  ElementModifierStatement, ElementNode, GapKind, GrammarGap, MustacheCommentStatement,
  MustacheStatement, Node, PartialBlockStatement, PartialStatement, Program, StripFlags,
  TagComment, Template, TextNode, VOID_TAGS, Verbatim, is_void_tag,
};

/// Abstract Syntax Tree representing the source
#[must_use]
#[derive(Debug)]
pub struct AST {
  /// The source code which the AST is for
  pub source: String,
  /// Index of line locations, lazily constructed when required
  line_index: OnceCell<LineIndex>,

  /// The root of the template
  pub template: Template,

  /// Errors found during parsing
  pub errors: Vec<ParseError>,
}
impl AST {
  pub(crate) fn new(source: String) -> Self {
    Self {
      source,
      line_index: OnceCell::new(),
      template: Template::default(),
      errors: Vec::new(),
    }
  }

  /// Is the parsed AST valid, with no errors found during parsing?
  #[must_use]
  pub fn is_valid(&self) -> bool {
    self.errors.is_empty()
  }

  /// The line index for the AST, the locations of the new lines in the source code
  ///
  /// It is lazily initialised, and will be initialised on the first call
  pub fn line_index(&self) -> &LineIndex {
    self
      .line_index
      .get_or_init(|| LineIndex::from_source(&self.source))
  }

  /// The top level content of the template
  pub fn body(&self) -> &[Node] {
    &self.template.body
  }
}
