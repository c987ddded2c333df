//! Printing of lists of children, and the whitespace between them.
//!
//! Text is where all the whitespace lives, so the printing of a text node depends on
//! its siblings. Each run of whitespace at the start or end of a text node becomes
//! either nothing, a space, a breakable line, or a number of forced line breaks.

use crate::config::WhitespaceSensitivity;
use crate::error::FormatError;
use crate::formatter::{Formattable, Formatter, IR};
use crate::helpers::{count_newlines, escape_mustache, is_html_whitespace};
use bumpalo::collections::Vec;
use curly_syntax::ast::{Node, TextNode};
use std::borrow::Cow;

/// The kind of node which contains a list of children
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parent {
  Template,
  Element,
  Block,
}

/// The surroundings of a node in a list of children
#[derive(Clone, Copy, Debug)]
pub struct Siblings<'a> {
  parent: Parent,
  previous: Option<&'a Node>,
  next: Option<&'a Node>,
}
impl Siblings<'_> {
  /// A node printed on its own
  pub fn alone() -> Self {
    Self {
      parent: Parent::Element,
      previous: None,
      next: None,
    }
  }
}

/// Print a list of children
pub fn children<'a>(
  f: &Formatter<'a>,
  nodes: &'a [Node],
  parent: Parent,
) -> Result<IR<'a>, FormatError> {
  let mut parts = Vec::with_capacity_in(nodes.len(), f.allocator);

  for (index, node) in nodes.iter().enumerate() {
    let siblings = Siblings {
      parent,
      previous: index.checked_sub(1).and_then(|index| nodes.get(index)),
      next: nodes.get(index + 1),
    };

    match node {
      Node::Text(node) => parts.push(text(f, node, siblings)),
      Node::Element(_)
        if f.whitespace_sensitivity() == WhitespaceSensitivity::Ignore
          && matches!(siblings.next, Some(Node::Element(_))) =>
      {
        parts.push(node.format(f)?);
        parts.push(IR::Line);
      }
      node => parts.push(node.format(f)?),
    }
  }

  Ok(IR::Concat(parts))
}

/// Print a text node, with the whitespace around its content
pub fn text<'a>(f: &Formatter<'a>, node: &'a TextNode, siblings: Siblings<'a>) -> IR<'a> {
  let chars = node.chars.as_str();
  if f.is_preformatted() {
    return match escape_mustache(chars) {
      Cow::Borrowed(chars) => f.literal_text(chars),
      Cow::Owned(chars) => f.literal_text(f.allocator.alloc_str(&chars)),
    };
  }

  let content = chars.trim_matches(is_html_whitespace);
  let leading = &chars[..chars.len() - chars.trim_start_matches(is_html_whitespace).len()];
  let trailing = &chars[chars.trim_end_matches(is_html_whitespace).len()..];

  match f.whitespace_sensitivity() {
    WhitespaceSensitivity::Strict => strict(f, content, leading, trailing, siblings),
    WhitespaceSensitivity::Ignore => ignore(f, content, leading, trailing, siblings),
  }
}

fn strict<'a>(
  f: &Formatter<'a>,
  content: &'a str,
  leading: &'a str,
  trailing: &'a str,
  siblings: Siblings<'a>,
) -> IR<'a> {
  let Siblings {
    parent,
    previous,
    next,
  } = siblings;

  // the start and end of the file lose their whitespace
  let first_in_template = parent == Parent::Template && previous.is_none();
  let last_in_template = parent == Parent::Template && next.is_none();
  let last_child = parent != Parent::Template && next.is_none();

  if content.is_empty() {
    if first_in_template || last_in_template {
      return IR::Empty;
    }

    let forced = previous.is_some_and(forces_break) || next.is_some_and(forces_break);
    let interpolation =
      previous.is_some_and(is_interpolation) || next.is_some_and(is_interpolation);
    let breaks = whitespace(f, leading, forced, interpolation);

    return if last_child { f.dedent(breaks) } else { breaks };
  }

  let leading = if first_in_template {
    IR::Empty
  } else {
    side(f, leading, previous, true)
  };
  let trailing = if last_in_template {
    IR::Empty
  } else if last_child {
    f.dedent(side(f, trailing, next, true))
  } else {
    side(f, trailing, next, true)
  };

  f.concat([leading, words(f, content), trailing])
}

fn ignore<'a>(
  f: &Formatter<'a>,
  content: &'a str,
  leading: &'a str,
  trailing: &'a str,
  siblings: Siblings<'a>,
) -> IR<'a> {
  let Siblings { previous, next, .. } = siblings;

  if content.is_empty() {
    if previous.is_none() || next.is_none() {
      return IR::Empty;
    }

    let interpolation =
      previous.is_some_and(is_interpolation) || next.is_some_and(is_interpolation);
    return whitespace(f, leading, false, interpolation);
  }

  let leading = if previous.is_none() {
    IR::Empty
  } else {
    side(f, leading, previous, false)
  };
  let trailing = if next.is_none() {
    IR::Empty
  } else {
    side(f, trailing, next, false)
  };

  f.concat([leading, words(f, content), trailing])
}

/// The whitespace between text content and a neighbouring node
fn side<'a>(
  f: &Formatter<'a>,
  whitespace_text: &str,
  neighbour: Option<&Node>,
  force_breaks: bool,
) -> IR<'a> {
  let forced = force_breaks && neighbour.is_some_and(forces_break);
  let interpolation = neighbour.is_some_and(is_interpolation);
  whitespace(f, whitespace_text, forced, interpolation)
}

/// Collapse a run of whitespace into the line breaks or space it represents
fn whitespace<'a>(f: &Formatter<'a>, text: &str, forced: bool, interpolation: bool) -> IR<'a> {
  let breaks = count_newlines(text).max(usize::from(forced));

  if breaks > 0 {
    f.hardlines(breaks)
  } else if text.is_empty() {
    IR::Empty
  } else if interpolation {
    IR::Text(" ")
  } else {
    IR::LineOrSpace
  }
}

/// Reflow the words of some text
fn words<'a>(f: &Formatter<'a>, content: &'a str) -> IR<'a> {
  let mut parts = Vec::new_in(f.allocator);

  for word in content.split(is_html_whitespace).filter(|word| !word.is_empty()) {
    if !parts.is_empty() {
      parts.push(IR::LineOrSpace);
    }

    parts.push(match escape_mustache(word) {
      Cow::Borrowed(word) => IR::Text(word),
      Cow::Owned(word) => f.text(&word),
    });
  }

  IR::Fill(parts)
}

/// Nodes which always start on a new line
fn forces_break(node: &Node) -> bool {
  matches!(node, Node::Block(_) | Node::Element(_))
}

/// Nodes whose adjacent whitespace is kept as a space, rather than a possible line break
fn is_interpolation(node: &Node) -> bool {
  matches!(node, Node::Mustache(_) | Node::Verbatim(_))
}
