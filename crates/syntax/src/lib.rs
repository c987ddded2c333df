//! # Syntax
//! Parse Handlebars/Glimmer templates into an Abstract Syntax Tree
//!
//! A hand-written recursive descent parser over the bytes of the source. HTML
//! content (text, elements, comments) is parsed directly, and the inside of each
//! mustache is tokenised and parsed into expressions.
//!
//! Tries to be error tolerant, and recover from errors to continue parsing. If a
//! delimiter is expected but is not found it will skip to the end of the mustache
//! (adding an error), and unclosed elements and blocks are closed at the next closing
//! tag which they can't contain.
//!
//! Some constructs can only be represented as source text, such as partials or blocks
//! inside of an attribute value. The parser captures them as grammar-level nodes, and
//! [normalize] rewrites them into nodes which can be printed.

pub mod ast;
mod normalize;
mod parser;
mod span;
mod tokeniser;

#[cfg(test)]
mod test;

/// Parses a source code string into a normalized AST, ready to be printed.
///
/// # Examples
/// ```
/// use curly_syntax::parse;
/// let ast = parse("<p>{{name}}</p>".to_owned());
///
/// assert!(ast.is_valid());
/// ```
pub fn parse(source: String) -> AST {
  normalize(parse_unnormalized(source))
}

/// Parses a source code string into an AST, keeping the grammar-level nodes.
///
/// # Examples
/// ```
/// use curly_syntax::{ast::Node, parse_unnormalized};
/// let ast = parse_unnormalized("{{> header}}".to_owned());
///
/// assert!(matches!(ast.body()[0], Node::Partial(_)));
/// ```
pub fn parse_unnormalized(source: String) -> AST {
  let mut ast = AST::new(source);
  let (template, errors) = parser::Parser::new(&ast.source).parse();
  ast.template = template;
  ast.errors = errors;
  ast
}

/// Get the tokens from the inside of a mustache, starting at a byte offset of the source
pub fn tokenise(source: &str, position: usize) -> impl Iterator<Item = tokeniser::Token> + '_ {
  tokeniser::Tokeniser::new(source, position)
}

pub use ast::AST;
pub use normalize::normalize;
pub use parser::ParseError;
pub use span::{LineIndex, Span};
pub use tokeniser::{Token, TokenKind};
