//! # Formatter
//!
//! Canonical formatting of Handlebars/Glimmer templates.
//!
//! Works in stages:
//! - Takes the normalized AST and converts it into an intermediate representation (IR)
//! - Then calculates how much of the intermediate representation it can fit in the print width
//! - Converts to a second IR which can be directly printed
//!
//! Based upon the algorithm described by Philip Wadler in [`A prettier printer`](https://homepages.inf.ed.ac.uk/wadler/papers/prettier/prettier.pdf).
//!
//! Whitespace in text is significant by default, so authored line breaks are kept
//! (up to one blank line) and spaces next to interpolations are never removed.

mod error;
mod formatter;
mod helpers;
mod printer;
mod whitespace;

pub mod config;

#[cfg(test)]
mod test;

use bumpalo::Bump as Allocator;
use curly_syntax::AST;
use formatter::{Formattable, Formatter};

/// Opinionated formatting of a template into a string.
/// Tries to respect the print width given in the config.
///
/// # Examples
/// ```
/// use curly_formatter::{format, FormatterConfig};
/// use curly_syntax::parse;
///
/// let ast = parse("<p   class='title'>{{  name  }}</p>".to_owned());
/// let config = FormatterConfig::default();
/// let formatted = format(&ast, config).unwrap();
///
/// assert_eq!(formatted.trim_end(), "<p class=\"title\">{{name}}</p>");
/// ```
///
/// # Errors
/// If the template contains nodes which are removed by normalization, such as partials
pub fn format(ast: &AST, config: FormatterConfig) -> Result<String, FormatError> {
  let allocator = Allocator::new();
  let formatter = Formatter::new(config, &ast.source, &allocator);
  formatter.print(&ast.template)
}

/// Print the intermediate representation of the template, before it is laid out
///
/// # Errors
/// If the template contains nodes which are removed by normalization, such as partials
pub fn print_document(ast: &AST, config: FormatterConfig) -> Result<String, FormatError> {
  let allocator = Allocator::new();
  let formatter = Formatter::new(config, &ast.source, &allocator);
  let ir = ast.template.format(&formatter)?;
  Ok(format!("{ir:#?}"))
}

pub use config::Config as FormatterConfig;
pub use config::{Indentation, LineEnding, Quote, WhitespaceSensitivity};
pub use error::FormatError;
