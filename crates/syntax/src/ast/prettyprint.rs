//! Pretty-print the AST into a human readable format.
//!
//! Based upon this [blog post](https://www.georgevreilly.com/blog/2023/01/24/TreeInRust2PrintingTrees.html)

use super::{AST, expression::*, statement::*};
use std::fmt;

impl fmt::Display for AST {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    writeln!(f, "Template")?;
    list(f, &self.template.body, "")
  }
}

const OTHER_CHILD: &str = "│  ";
const OTHER_ENTRY: &str = "├─ ";
const FINAL_CHILD: &str = "   ";
const FINAL_ENTRY: &str = "╰─ ";

pub trait PrettyPrint {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result;
}

fn connector(last: bool) -> &'static str {
  if last { FINAL_ENTRY } else { OTHER_ENTRY }
}

fn child_prefix(prefix: &str, last: bool) -> String {
  format!("{prefix}{}", if last { FINAL_CHILD } else { OTHER_CHILD })
}

fn list<T: PrettyPrint>(f: &mut fmt::Formatter, items: &[T], prefix: &str) -> fmt::Result {
  for (index, item) in items.iter().enumerate() {
    item.pretty(f, prefix, index + 1 == items.len())?;
  }
  Ok(())
}

/// A labelled group of children, e.g. `Params`
fn labelled<T: PrettyPrint>(
  f: &mut fmt::Formatter,
  label: &str,
  items: &[T],
  prefix: &str,
  last: bool,
) -> fmt::Result {
  writeln!(f, "{prefix}{}{label}", connector(last))?;
  list(f, items, &child_prefix(prefix, last))
}

fn strip_markers(strip: StripFlags) -> &'static str {
  match (strip.open, strip.close) {
    (false, false) => "",
    (true, false) => " [~ ]",
    (false, true) => " [ ~]",
    (true, true) => " [~ ~]",
  }
}

impl PrettyPrint for Node {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    match self {
      Self::Text(x) => x.pretty(f, prefix, last),
      Self::Mustache(x) => x.pretty(f, prefix, last),
      Self::Block(x) => x.pretty(f, prefix, last),
      Self::Element(x) => x.pretty(f, prefix, last),
      Self::Comment(x) => {
        writeln!(f, "{prefix}{}Comment {:?}", connector(last), x.value)
      }
      Self::MustacheComment(x) => x.pretty(f, prefix, last),
      Self::Verbatim(x) => x.pretty(f, prefix, last),
      Self::Partial(x) => {
        writeln!(f, "{prefix}{}Partial", connector(last))?;
        let prefix = child_prefix(prefix, last);
        let has_arguments = !x.params.is_empty() || !x.hash.is_empty();
        x.name.pretty(f, &prefix, !has_arguments)?;
        arguments(f, &x.params, &x.hash, &prefix, true)
      }
      Self::PartialBlock(x) => {
        writeln!(f, "{prefix}{}Partial Block ({})", connector(last), x.name)?;
        let prefix = child_prefix(prefix, last);
        arguments(f, &x.params, &x.hash, &prefix, false)?;
        labelled(f, "Program", &x.program.body, &prefix, true)
      }
    }
  }
}

/// Print the positional and named arguments of a call, if there are any
fn arguments(
  f: &mut fmt::Formatter,
  params: &[Expression],
  hash: &Hash,
  prefix: &str,
  last: bool,
) -> fmt::Result {
  if !params.is_empty() {
    labelled(f, "Params", params, prefix, last && hash.is_empty())?;
  }
  if !hash.is_empty() {
    labelled(f, "Hash", &hash.pairs, prefix, last)?;
  }
  Ok(())
}

impl PrettyPrint for TextNode {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}Text {:?}", connector(last), self.chars)
  }
}
impl PrettyPrint for Verbatim {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}Verbatim {:?}", connector(last), self.text)
  }
}
impl PrettyPrint for MustacheCommentStatement {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}Mustache Comment {:?}", connector(last), self.value)
  }
}
impl PrettyPrint for MustacheStatement {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    let kind = if self.trusting { "Triple Mustache" } else { "Mustache" };
    writeln!(f, "{prefix}{}{kind}{}", connector(last), strip_markers(self.strip))?;

    let prefix = child_prefix(prefix, last);
    let has_arguments = !self.params.is_empty() || !self.hash.is_empty();
    self.path.pretty(f, &prefix, !has_arguments)?;
    arguments(f, &self.params, &self.hash, &prefix, true)
  }
}
impl PrettyPrint for ElementModifierStatement {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}Modifier{}", connector(last), strip_markers(self.strip))?;

    let prefix = child_prefix(prefix, last);
    let has_arguments = !self.params.is_empty() || !self.hash.is_empty();
    self.path.pretty(f, &prefix, !has_arguments)?;
    arguments(f, &self.params, &self.hash, &prefix, true)
  }
}
impl PrettyPrint for BlockStatement {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    let kind = match self.kind {
      BlockKind::Helper => "Block",
      BlockKind::Partial => "Partial Block",
    };
    writeln!(
      f,
      "{prefix}{}{kind} ({}){}",
      connector(last),
      self.path,
      strip_markers(self.open_strip)
    )?;

    let prefix = child_prefix(prefix, last);
    arguments(f, &self.params, &self.hash, &prefix, false)?;

    let block_params = if self.program.block_params.is_empty() {
      String::new()
    } else {
      format!(" as |{}|", self.program.block_params.join(" "))
    };
    writeln!(
      f,
      "{prefix}{}Program{block_params}",
      connector(self.inverse.is_none())
    )?;
    list(
      f,
      &self.program.body,
      &child_prefix(&prefix, self.inverse.is_none()),
    )?;

    if let Some(inverse) = &self.inverse {
      writeln!(
        f,
        "{prefix}{FINAL_ENTRY}Inverse{}",
        strip_markers(self.inverse_strip)
      )?;
      list(f, &inverse.body, &child_prefix(&prefix, true))?;
    }

    Ok(())
  }
}
impl PrettyPrint for ElementNode {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    let closing = if self.self_closing { " /" } else { "" };
    writeln!(f, "{prefix}{}Element <{}{closing}>", connector(last), self.tag)?;

    let prefix = child_prefix(prefix, last);
    let has_modifiers = !self.modifiers.is_empty();
    let has_comments = !self.comments.is_empty();
    let has_children = !self.children.is_empty();

    if !self.attributes.is_empty() {
      let last = !has_modifiers && !has_comments && !has_children;
      labelled(f, "Attributes", &self.attributes, &prefix, last)?;
    }
    if has_modifiers {
      let last = !has_comments && !has_children;
      labelled(f, "Modifiers", &self.modifiers, &prefix, last)?;
    }
    if has_comments {
      labelled(f, "Comments", &self.comments, &prefix, !has_children)?;
    }
    if has_children {
      labelled(f, "Children", &self.children, &prefix, true)?;
    }

    Ok(())
  }
}
impl PrettyPrint for TagComment {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    match self {
      Self::Comment(x) => x.pretty(f, prefix, last),
      Self::Verbatim(x) => x.pretty(f, prefix, last),
      Self::Gap(x) => x.pretty(f, prefix, last),
    }
  }
}
impl PrettyPrint for GrammarGap {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}Gap ({:?}) {:?}", connector(last), self.kind, self.text)
  }
}
impl PrettyPrint for AttrNode {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    if self.is_valueless() {
      return writeln!(f, "{prefix}{}Attribute ({})", connector(last), self.name);
    }

    writeln!(f, "{prefix}{}Attribute ({})", connector(last), self.name)?;
    let prefix = child_prefix(prefix, last);
    match &self.value {
      AttrValue::Text(text) => text.pretty(f, &prefix, true),
      AttrValue::Mustache(mustache) => mustache.pretty(f, &prefix, true),
      AttrValue::Concat(concat) => labelled(f, "Concat", &concat.parts, &prefix, true),
    }
  }
}
impl PrettyPrint for ConcatPart {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    match self {
      Self::Text(x) => x.pretty(f, prefix, last),
      Self::Mustache(x) => x.pretty(f, prefix, last),
      Self::Verbatim(x) => x.pretty(f, prefix, last),
      Self::Gap(x) => x.pretty(f, prefix, last),
    }
  }
}

impl PrettyPrint for Expression {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    let connector = connector(last);
    match self {
      Self::Path(x) => writeln!(f, "{prefix}{connector}Path ({})", x.original),
      Self::SubExpression(x) => x.pretty(f, prefix, last),
      Self::String(x) => writeln!(f, "{prefix}{connector}String {:?}", x.value),
      Self::Number(x) => writeln!(f, "{prefix}{connector}Number ({})", x.value),
      Self::Boolean(x) => writeln!(f, "{prefix}{connector}Boolean ({})", x.value),
      Self::Null(_) => writeln!(f, "{prefix}{connector}Null"),
      Self::Undefined(_) => writeln!(f, "{prefix}{connector}Undefined"),
    }
  }
}
impl PrettyPrint for SubExpression {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}Sub Expression", connector(last))?;

    let prefix = child_prefix(prefix, last);
    let has_arguments = !self.params.is_empty() || !self.hash.is_empty();
    self.path.pretty(f, &prefix, !has_arguments)?;
    arguments(f, &self.params, &self.hash, &prefix, true)
  }
}
impl PrettyPrint for HashPair {
  fn pretty(&self, f: &mut fmt::Formatter, prefix: &str, last: bool) -> fmt::Result {
    writeln!(f, "{prefix}{}{}=", connector(last), self.key)?;
    self.value.pretty(f, &child_prefix(prefix, last), true)
  }
}
