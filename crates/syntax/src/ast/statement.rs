//! # Statements
//!
//! The content of a template: text, HTML elements and comments, and the
//! mustache statements which interleave with them.

use crate::{
  ast::expression::{Expression, Hash, PathExpression},
  span::Span,
};
use thin_vec::ThinVec;

/// The HTML elements which never have children or a closing tag
pub const VOID_TAGS: [&str; 14] = [
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
  "track", "wbr",
];

/// Elements whose text content is displayed exactly as written
pub const WHITESPACE_SENSITIVE_TAGS: [&str; 4] = ["pre", "textarea", "listing", "plaintext"];

/// A piece of template content
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
  /// A run of characters, e.g. `hello world`
  Text(TextNode),
  /// An interpolation, e.g. `{{name}}`, `{{{html}}}`
  Mustache(MustacheStatement),
  /// A block helper, e.g. `{{#if x}}..{{else}}..{{/if}}`
  Block(BlockStatement),
  /// An HTML element, e.g. `<div class="x">..</div>`
  Element(ElementNode),
  /// An HTML comment, e.g. `<!-- text -->`
  Comment(CommentStatement),
  /// A template comment, e.g. `{{! text}}`, `{{!-- text --}}`
  MustacheComment(MustacheCommentStatement),
  /// Source text re-emitted exactly as written
  Verbatim(Verbatim),

  /// A partial, e.g. `{{> name}}`. Removed by normalisation
  Partial(PartialStatement),
  /// A partial block, e.g. `{{#> name}}..{{/name}}`. Removed by normalisation
  PartialBlock(PartialBlockStatement),
}
impl Node {
  /// The location of the node
  pub fn span(&self) -> Span {
    match self {
      Self::Text(text) => text.span,
      Self::Mustache(mustache) => mustache.span,
      Self::Block(block) => block.span,
      Self::Element(element) => element.span,
      Self::Comment(comment) => comment.span,
      Self::MustacheComment(comment) => comment.span,
      Self::Verbatim(verbatim) => verbatim.span,
      Self::Partial(partial) => partial.span,
      Self::PartialBlock(partial_block) => partial_block.span,
    }
  }

  /// The name of the kind of node, used in tree views and error messages
  #[must_use]
  pub const fn kind(&self) -> &'static str {
    match self {
      Self::Text(_) => "TextNode",
      Self::Mustache(_) => "MustacheStatement",
      Self::Block(_) => "BlockStatement",
      Self::Element(_) => "ElementNode",
      Self::Comment(_) => "CommentStatement",
      Self::MustacheComment(_) => "MustacheCommentStatement",
      Self::Verbatim(_) => "Verbatim",
      Self::Partial(_) => "PartialStatement",
      Self::PartialBlock(_) => "PartialBlockStatement",
    }
  }

  /// Is the node a text run containing only whitespace?
  #[must_use]
  pub fn is_whitespace_only(&self) -> bool {
    matches!(self, Self::Text(text) if text.is_whitespace_only())
  }
}

/// The root of a template
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Template {
  /// The top level content
  pub body: ThinVec<Node>,
  /// The location of the whole template
  pub span: Span,
}

/// A branch of a block, e.g. the content between `{{#each xs as |x|}}` and `{{/each}}`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
  /// The content of the branch
  pub body: ThinVec<Node>,
  /// The names declared with `as |a b|`
  pub block_params: ThinVec<String>,
  /// The location of the content
  pub span: Span,
}
impl Program {
  /// Does the branch contain only whitespace?
  #[must_use]
  pub fn is_whitespace_only(&self) -> bool {
    self.body.iter().all(Node::is_whitespace_only)
  }
}

/// A run of characters
///
/// An escaped delimiter in the source (`\{{`) appears in `chars` as `{{`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
  /// The characters of the text
  pub chars: String,
  /// The location of the text
  pub span: Span,
}
impl TextNode {
  /// Does the text contain only HTML whitespace (ASCII space, tab and line breaks)?
  #[must_use]
  pub fn is_whitespace_only(&self) -> bool {
    self.chars.chars().all(|c| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C'))
  }
}

/// An HTML element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
  /// The tag name, e.g. `div`
  pub tag: String,
  /// The attributes, e.g. `class="x"`
  pub attributes: ThinVec<AttrNode>,
  /// The modifiers, e.g. `{{on "click" this.go}}`
  pub modifiers: ThinVec<ElementModifierStatement>,
  /// Template comments and other items in the attribute region of the tag
  pub comments: ThinVec<TagComment>,
  /// The content of the element
  pub children: ThinVec<Node>,
  /// Is the tag written as `<tag />`?
  pub self_closing: bool,
  /// The location of the whole element, including the closing tag
  pub span: Span,
}
impl ElementNode {
  /// Is the element one of the HTML void elements, e.g. `img`, `br`?
  #[must_use]
  pub fn is_void(&self) -> bool {
    is_void_tag(&self.tag)
  }

  /// Is all whitespace inside the element rendered, e.g. `pre`, `textarea`?
  #[must_use]
  pub fn is_whitespace_sensitive(&self) -> bool {
    WHITESPACE_SENSITIVE_TAGS
      .iter()
      .any(|tag| tag.eq_ignore_ascii_case(&self.tag))
  }
}

/// Is the tag name one of the HTML void elements?
#[must_use]
pub fn is_void_tag(tag: &str) -> bool {
  VOID_TAGS.iter().any(|void| void.eq_ignore_ascii_case(tag))
}

/// An item in the attribute region of a tag which isn't an attribute or a modifier
#[derive(Debug, Clone, PartialEq)]
pub enum TagComment {
  /// A template comment, e.g. `<div {{! note}}>`
  Comment(MustacheCommentStatement),
  /// Source text re-emitted exactly as written
  Verbatim(Verbatim),
  /// A block or partial which can't be placed in a tag. Removed by normalisation
  Gap(GrammarGap),
}
impl TagComment {
  /// The location of the item
  pub fn span(&self) -> Span {
    match self {
      Self::Comment(comment) => comment.span,
      Self::Verbatim(verbatim) => verbatim.span,
      Self::Gap(gap) => gap.span,
    }
  }
}

/// An attribute of an element, e.g. `class="a {{b}}"`
#[derive(Debug, Clone, PartialEq)]
pub struct AttrNode {
  /// The name of the attribute
  pub name: String,
  /// The value of the attribute
  pub value: AttrValue,
  /// The location of the attribute
  pub span: Span,
}
impl AttrNode {
  /// Is the attribute written without a value, e.g. `disabled`?
  #[must_use]
  pub fn is_valueless(&self) -> bool {
    matches!(&self.value, AttrValue::Text(text) if text.chars.is_empty() && text.span.is_empty())
  }
}

/// The value of an attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
  /// Plain text, e.g. `class="x"` or `class=x`
  Text(TextNode),
  /// A single unquoted mustache, e.g. `class={{x}}`
  Mustache(MustacheStatement),
  /// A quoted value containing mustaches, e.g. `class="a {{b}}"`
  Concat(ConcatStatement),
}
impl AttrValue {
  /// The location of the value
  pub fn span(&self) -> Span {
    match self {
      Self::Text(text) => text.span,
      Self::Mustache(mustache) => mustache.span,
      Self::Concat(concat) => concat.span,
    }
  }
}

/// A quoted attribute value made of several parts
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatStatement {
  /// The parts of the value, in source order
  pub parts: ThinVec<ConcatPart>,
  /// The location of the value, including the quotes
  pub span: Span,
}

/// A part of a quoted attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum ConcatPart {
  /// A run of text
  Text(TextNode),
  /// An interpolation
  Mustache(MustacheStatement),
  /// Source text re-emitted exactly as written
  Verbatim(Verbatim),
  /// A block or partial which can't be placed in a value. Removed by normalisation
  Gap(GrammarGap),
}
impl ConcatPart {
  /// The location of the part
  pub fn span(&self) -> Span {
    match self {
      Self::Text(text) => text.span,
      Self::Mustache(mustache) => mustache.span,
      Self::Verbatim(verbatim) => verbatim.span,
      Self::Gap(gap) => gap.span,
    }
  }
}

/// Whether whitespace is stripped next to the delimiters, e.g. `{{~x~}}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripFlags {
  /// Is there a `~` after the opening delimiter?
  pub open: bool,
  /// Is there a `~` before the closing delimiter?
  pub close: bool,
}

/// An interpolation, e.g. `{{helper arg key=value}}`
#[derive(Debug, Clone, PartialEq)]
pub struct MustacheStatement {
  /// The value, or helper being called
  pub path: Expression,
  /// Positional arguments
  pub params: ThinVec<Expression>,
  /// Named arguments
  pub hash: Hash,
  /// Is the output unescaped (written with triple curlies)?
  pub trusting: bool,
  /// The whitespace stripping markers
  pub strip: StripFlags,
  /// The location of the statement, including the delimiters
  pub span: Span,
}

/// A modifier in the attribute region of a tag, e.g. `<div {{on "click" go}}>`
#[derive(Debug, Clone, PartialEq)]
pub struct ElementModifierStatement {
  /// The modifier being called
  pub path: Expression,
  /// Positional arguments
  pub params: ThinVec<Expression>,
  /// Named arguments
  pub hash: Hash,
  /// The whitespace stripping markers
  pub strip: StripFlags,
  /// The location of the statement, including the delimiters
  pub span: Span,
}

/// The kind of a block statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlockKind {
  /// A block helper, `{{#name}}`
  #[default]
  Helper,
  /// A partial block, `{{#> name}}`
  Partial,
}

/// A block, e.g. `{{#each items as |item|}}..{{else}}..{{/each}}`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
  /// Is it a helper block or a partial block?
  pub kind: BlockKind,
  /// The helper being called, or the partial being rendered
  pub path: PathExpression,
  /// Positional arguments
  pub params: ThinVec<Expression>,
  /// Named arguments
  pub hash: Hash,
  /// The main branch
  pub program: Program,
  /// The `{{else}}` branch
  pub inverse: Option<Program>,
  /// Stripping markers of the opening tag
  pub open_strip: StripFlags,
  /// Stripping markers of the `{{else}}` tag
  pub inverse_strip: StripFlags,
  /// Stripping markers of the closing tag
  pub close_strip: StripFlags,
  /// The location of the whole block
  pub span: Span,
}

/// An HTML comment, e.g. `<!-- text -->`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentStatement {
  /// The text between `<!--` and `-->`
  pub value: String,
  /// The location of the comment
  pub span: Span,
}

/// A template comment, e.g. `{{! text}}`, `{{!-- text --}}`
///
/// The stripping markers aren't stored, they are recovered from the source when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MustacheCommentStatement {
  /// The text of the comment, without the delimiters and dashes
  pub value: String,
  /// The location of the comment, including the delimiters
  pub span: Span,
}

/// Source text which is emitted exactly as written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verbatim {
  /// The source text
  pub text: String,
  /// The location the text came from
  pub span: Span,
}

/// A partial, e.g. `{{> name arg key=value}}`
#[derive(Debug, Clone, PartialEq)]
pub struct PartialStatement {
  /// The partial being rendered
  pub name: Expression,
  /// Positional arguments
  pub params: ThinVec<Expression>,
  /// Named arguments
  pub hash: Hash,
  /// The whitespace stripping markers
  pub strip: StripFlags,
  /// The location of the statement
  pub span: Span,
}

/// A partial block, e.g. `{{#> layout}}..{{/layout}}`
#[derive(Debug, Clone, PartialEq)]
pub struct PartialBlockStatement {
  /// The partial being rendered
  pub name: PathExpression,
  /// Positional arguments
  pub params: ThinVec<Expression>,
  /// Named arguments
  pub hash: Hash,
  /// The content passed to the partial
  pub program: Program,
  /// Stripping markers of the opening tag
  pub open_strip: StripFlags,
  /// Stripping markers of the closing tag
  pub close_strip: StripFlags,
  /// The location of the whole block
  pub span: Span,
}

/// The kind of construct captured by a [`GrammarGap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
  /// A block, e.g. `{{#if x}}..{{/if}}`
  Block,
  /// A partial, e.g. `{{> name}}`
  Partial,
}

/// A block or partial in a position the grammar can't represent, captured as source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarGap {
  /// What kind of construct it is
  pub kind: GapKind,
  /// The source text of the construct
  pub text: String,
  /// The location of the construct
  pub span: Span,
}
