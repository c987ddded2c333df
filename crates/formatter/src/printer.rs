use crate::config::{Quote, WhitespaceSensitivity};
use crate::error::FormatError;
use crate::formatter::{Formattable, Formatter, IR};
use crate::helpers::{escape_attribute_text, escape_string, is_html_whitespace, preferred_quote};
use crate::whitespace::{self, Parent, Siblings};
use bumpalo::collections::Vec;
use curly_syntax::{
  Span,
  ast::{expression::*, statement::*},
};
use std::borrow::Cow;

impl<'a> Formattable<'a> for Template {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    Ok(f.group([whitespace::children(f, &self.body, Parent::Template)?]))
  }
}
impl<'a> Formattable<'a> for Program {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    Ok(f.group([whitespace::children(f, &self.body, Parent::Block)?]))
  }
}

impl<'a> Formattable<'a> for Node {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    log::trace!("printing {}", self.kind());

    match self {
      Node::Text(text) => Ok(whitespace::text(f, text, Siblings::alone())),
      Node::Mustache(mustache) => mustache.format(f),
      Node::Block(block) => block.format(f),
      Node::Element(element) => element.format(f),
      Node::Comment(comment) => comment.format(f),
      Node::MustacheComment(comment) => comment.format(f),
      Node::Verbatim(verbatim) => verbatim.format(f),
      Node::Partial(_) | Node::PartialBlock(_) => Err(unsupported(self.kind(), self.span())),
    }
  }
}

fn unsupported(kind: &'static str, span: Span) -> FormatError {
  FormatError::UnsupportedNode { kind, span }
}

fn tilde<'a>(strip: bool) -> IR<'a> {
  if strip { IR::Text("~") } else { IR::Empty }
}

/// The positional and named arguments of a call, separated by lines
fn params<'a>(
  f: &Formatter<'a>,
  params: &'a [Expression],
  hash: &'a Hash,
) -> Result<Option<IR<'a>>, FormatError> {
  if params.is_empty() && hash.is_empty() {
    return Ok(None);
  }

  let mut parts = Vec::with_capacity_in(params.len() + 1, f.allocator);
  for param in params {
    parts.push(param.format(f)?);
  }
  if !hash.is_empty() {
    parts.push(hash.format(f)?);
  }

  Ok(Some(f.join(parts, || IR::LineOrSpace)))
}

fn path_and_params<'a>(
  f: &Formatter<'a>,
  path: &'a Expression,
  arguments: &'a [Expression],
  hash: &'a Hash,
) -> Result<IR<'a>, FormatError> {
  let path = path.format(f)?;

  match params(f, arguments, hash)? {
    Some(params) => Ok(f.concat([f.indent([path, IR::LineOrSpace, params]), IR::Line])),
    None => Ok(path),
  }
}

impl<'a> Formattable<'a> for MustacheStatement {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    let (open, close) = if self.trusting {
      ("{{{", "}}}")
    } else {
      ("{{", "}}")
    };

    Ok(f.group([
      IR::Text(open),
      tilde(self.strip.open),
      path_and_params(f, &self.path, &self.params, &self.hash)?,
      tilde(self.strip.close),
      IR::Text(close),
    ]))
  }
}
impl<'a> Formattable<'a> for ElementModifierStatement {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    Ok(f.group([
      IR::Text("{{"),
      tilde(self.strip.open),
      path_and_params(f, &self.path, &self.params, &self.hash)?,
      tilde(self.strip.close),
      IR::Text("}}"),
    ]))
  }
}

impl<'a> Formattable<'a> for BlockStatement {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    let open = open_block(f, self)?;
    let program = program(f, self)?;
    let inverse = inverse(f, self)?;
    let close = close_block(f, self);

    Ok(f.concat([open, f.group([program, inverse, close])]))
  }
}

/// The arguments of an opening block tag, params then block params
fn block_arguments<'a>(
  f: &Formatter<'a>,
  block: &'a BlockStatement,
) -> Result<IR<'a>, FormatError> {
  let mut parts = Vec::new_in(f.allocator);
  if let Some(params) = params(f, &block.params, &block.hash)? {
    parts.push(f.group([params]));
  }
  if !block.program.block_params.is_empty() {
    let names = block.program.block_params.join(" ");
    parts.push(f.text(&format!("as |{names}|")));
  }

  if parts.is_empty() {
    Ok(IR::Empty)
  } else {
    Ok(f.indent([IR::LineOrSpace, f.join(parts, || IR::LineOrSpace)]))
  }
}

fn open_block<'a>(f: &Formatter<'a>, block: &'a BlockStatement) -> Result<IR<'a>, FormatError> {
  let sigil = match block.kind {
    BlockKind::Helper => "#",
    BlockKind::Partial => "#> ",
  };

  Ok(f.group([
    IR::Text("{{"),
    tilde(block.open_strip.open),
    IR::Text(sigil),
    IR::Text(&block.path.original),
    block_arguments(f, block)?,
    IR::Line,
    tilde(block.open_strip.close),
    IR::Text("}}"),
  ]))
}

fn program<'a>(f: &Formatter<'a>, block: &'a BlockStatement) -> Result<IR<'a>, FormatError> {
  if block.program.is_whitespace_only() {
    return Ok(IR::Empty);
  }

  let program = block.program.format(f)?;
  Ok(match f.whitespace_sensitivity() {
    WhitespaceSensitivity::Strict => f.indent([program]),
    WhitespaceSensitivity::Ignore => f.indent([IR::AlwaysLine, program]),
  })
}

/// An inverse containing just a block with the same helper, `{{else if x}}`
///
/// Its strip markers must match the `{{else}}` and closing tags it would share.
fn else_chain(block: &BlockStatement) -> Option<&BlockStatement> {
  match block.inverse.as_ref()?.body.as_slice() {
    [Node::Block(chained)]
      if chained.kind == BlockKind::Helper
        && chained.path.head() == block.path.head()
        && chained.open_strip == block.inverse_strip
        && chained.close_strip == block.close_strip =>
    {
      Some(chained)
    }
    _ => None,
  }
}

fn inverse<'a>(f: &Formatter<'a>, block: &'a BlockStatement) -> Result<IR<'a>, FormatError> {
  let Some(inverse) = &block.inverse else {
    return Ok(IR::Empty);
  };
  let strip = block.inverse_strip;
  let ignore_whitespace = f.whitespace_sensitivity() == WhitespaceSensitivity::Ignore;

  if let Some(chained) = else_chain(block) {
    log::trace!("collapsing else chain `{{{{else {}}}}}`", chained.path);

    let tag = f.group([
      IR::Text("{{"),
      tilde(strip.open),
      IR::Text("else "),
      IR::Text(&chained.path.original),
      block_arguments(f, chained)?,
      IR::Line,
      tilde(strip.close),
      IR::Text("}}"),
    ]);
    let branch = f.concat([tag, program(f, chained)?, self::inverse(f, chained)?]);

    return Ok(if ignore_whitespace {
      f.concat([IR::AlwaysLine, branch])
    } else {
      branch
    });
  }

  let tag = f.concat([
    IR::Text("{{"),
    tilde(strip.open),
    IR::Text("else"),
    tilde(strip.close),
    IR::Text("}}"),
  ]);

  let body = if inverse.is_whitespace_only() {
    IR::Empty
  } else if ignore_whitespace {
    f.indent([IR::AlwaysLine, inverse.format(f)?])
  } else {
    f.indent([inverse.format(f)?])
  };

  Ok(if ignore_whitespace {
    f.concat([IR::AlwaysLine, tag, body])
  } else {
    f.concat([tag, body])
  })
}

fn close_block<'a>(f: &Formatter<'a>, block: &'a BlockStatement) -> IR<'a> {
  let close = f.concat([
    IR::Text("{{"),
    tilde(block.close_strip.open),
    IR::Text("/"),
    IR::Text(&block.path.original),
    tilde(block.close_strip.close),
    IR::Text("}}"),
  ]);

  match f.whitespace_sensitivity() {
    WhitespaceSensitivity::Strict => close,
    WhitespaceSensitivity::Ignore if block.program.is_whitespace_only() => {
      f.concat([IR::Line, close])
    }
    WhitespaceSensitivity::Ignore => f.concat([IR::AlwaysLine, close]),
  }
}

impl<'a> Formattable<'a> for ElementNode {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    let start = starting_tag(f, self)?;
    if self.self_closing || self.is_void() {
      return Ok(start);
    }

    let end = f.concat([IR::Text("</"), IR::Text(&self.tag), IR::Text(">")]);
    if self.is_whitespace_sensitive() || f.is_preformatted() {
      let children =
        f.with_preformatted(|| whitespace::children(f, &self.children, Parent::Element))?;
      return Ok(f.concat([start, children, end]));
    }
    if self.children.iter().all(Node::is_whitespace_only) {
      return Ok(f.concat([start, end]));
    }

    let children = whitespace::children(f, &self.children, Parent::Element)?;
    Ok(match f.whitespace_sensitivity() {
      WhitespaceSensitivity::Strict => f.concat([start, f.indent([f.group([children])]), end]),
      WhitespaceSensitivity::Ignore => {
        f.concat([start, f.indent([IR::Line, children]), IR::AlwaysLine, end])
      }
    })
  }
}

/// Something inside of an opening tag
enum TagItem<'a> {
  Attribute(&'a AttrNode),
  Modifier(&'a ElementModifierStatement),
  Comment(&'a TagComment),
}
impl TagItem<'_> {
  fn start(&self) -> u32 {
    match self {
      Self::Attribute(attribute) => attribute.span.start,
      Self::Modifier(modifier) => modifier.span.start,
      Self::Comment(comment) => comment.span().start,
    }
  }
}

fn starting_tag<'a>(f: &Formatter<'a>, element: &'a ElementNode) -> Result<IR<'a>, FormatError> {
  let mut items: std::vec::Vec<_> = (element.attributes.iter())
    .map(TagItem::Attribute)
    .chain(element.modifiers.iter().map(TagItem::Modifier))
    .chain(element.comments.iter().map(TagItem::Comment))
    .collect();
  items.sort_by_key(TagItem::start);

  let mut parts = Vec::with_capacity_in(items.len() * 2, f.allocator);
  for item in items {
    parts.push(IR::LineOrSpace);
    parts.push(match item {
      TagItem::Attribute(attribute) => attribute.format(f)?,
      TagItem::Modifier(modifier) => modifier.format(f)?,
      TagItem::Comment(comment) => comment.format(f)?,
    });
  }

  let end = if element.self_closing {
    f.if_break(f.concat([IR::Line, IR::Text("/>")]), IR::Text(" />"))
  } else {
    f.if_break(f.concat([IR::Line, IR::Text(">")]), IR::Text(">"))
  };

  Ok(f.group([
    IR::Text("<"),
    IR::Text(&element.tag),
    f.indent([IR::Concat(parts)]),
    end,
  ]))
}

impl<'a> Formattable<'a> for TagComment {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    match self {
      TagComment::Comment(comment) => comment.format(f),
      TagComment::Verbatim(verbatim) => verbatim.format(f),
      TagComment::Gap(gap) => Err(unsupported("GrammarGap", gap.span)),
    }
  }
}

impl<'a> Formattable<'a> for AttrNode {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    if self.is_valueless() {
      return Ok(IR::Text(&self.name));
    }

    let preferred = f.config.preferred_quote;
    let (quote, value) = match &self.value {
      AttrValue::Mustache(mustache) => {
        return Ok(f.concat([IR::Text(&self.name), IR::Text("="), mustache.format(f)?]));
      }
      AttrValue::Text(text) => {
        let quote = preferred_quote([text.chars.as_str()], preferred);
        (quote, attribute_text(f, &self.name, text, quote, None, None))
      }
      AttrValue::Concat(concat) => {
        let quote = preferred_quote(
          concat.parts.iter().filter_map(|part| match part {
            ConcatPart::Text(text) => Some(text.chars.as_str()),
            ConcatPart::Verbatim(verbatim) => Some(verbatim.text.as_str()),
            ConcatPart::Mustache(_) | ConcatPart::Gap(_) => None,
          }),
          preferred,
        );
        let parts = f.with_attribute_quote(quote, || concat_parts(f, &self.name, concat, quote))?;
        (quote, parts)
      }
    };

    let value = if self.name == "class" {
      f.group([f.indent([value])])
    } else {
      value
    };

    Ok(f.concat([
      IR::Text(&self.name),
      IR::Text("="),
      IR::Text(quote.as_str()),
      value,
      IR::Text(quote.as_str()),
    ]))
  }
}

fn concat_parts<'a>(
  f: &Formatter<'a>,
  name: &str,
  concat: &'a ConcatStatement,
  quote: Quote,
) -> Result<IR<'a>, FormatError> {
  let mut parts = Vec::with_capacity_in(concat.parts.len(), f.allocator);

  for (index, part) in concat.parts.iter().enumerate() {
    parts.push(match part {
      ConcatPart::Text(text) => {
        let previous = index.checked_sub(1).and_then(|index| concat.parts.get(index));
        let next = concat.parts.get(index + 1);
        attribute_text(f, name, text, quote, previous, next)
      }
      ConcatPart::Mustache(mustache) => mustache.format(f)?,
      ConcatPart::Verbatim(verbatim) => verbatim.format(f)?,
      ConcatPart::Gap(gap) => return Err(unsupported("GrammarGap", gap.span)),
    });
  }

  Ok(IR::Concat(parts))
}

/// Text inside a quoted attribute value
fn attribute_text<'a>(
  f: &Formatter<'a>,
  name: &str,
  text: &'a TextNode,
  quote: Quote,
  previous: Option<&ConcatPart>,
  next: Option<&ConcatPart>,
) -> IR<'a> {
  if name == "class" {
    let is_interpolation =
      |part: &ConcatPart| matches!(part, ConcatPart::Mustache(_) | ConcatPart::Verbatim(_));

    let classes = text.chars.split(is_html_whitespace).filter(|class| !class.is_empty());
    let classes = classes.collect::<std::vec::Vec<_>>().join(" ");
    let leading = previous.is_some_and(is_interpolation)
      && text.chars.starts_with(is_html_whitespace)
      && (!classes.is_empty() || next.is_some());
    let trailing = next.is_some_and(is_interpolation)
      && text.chars.ends_with(is_html_whitespace)
      && !classes.is_empty();

    return f.concat([
      if leading { IR::LineOrSpace } else { IR::Empty },
      f.text(&escape_attribute_text(&classes, quote)),
      if trailing { IR::LineOrSpace } else { IR::Empty },
    ]);
  }

  match escape_attribute_text(&text.chars, quote) {
    Cow::Borrowed(text) => f.literal_text(text),
    Cow::Owned(text) => f.literal_text(f.allocator.alloc_str(&text)),
  }
}

impl<'a> Formattable<'a> for CommentStatement {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    Ok(f.concat([
      IR::Text("<!--"),
      f.literal_text(&self.value),
      IR::Text("-->"),
    ]))
  }
}
impl<'a> Formattable<'a> for MustacheCommentStatement {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    let source = f.source.as_bytes();
    let start = self.span.start as usize;
    let end = self.span.end as usize;

    let strip_open = source.get(start + 2) == Some(&b'~');
    let strip_close = end >= 3 && source.get(end - 3) == Some(&b'~');
    // the long form is only needed if the comment contains a closing delimiter
    let dashes = if self.value.contains("}}") { "--" } else { "" };

    Ok(f.concat([
      IR::Text("{{"),
      tilde(strip_open),
      IR::Text("!"),
      IR::Text(dashes),
      f.literal_text(&self.value),
      IR::Text(dashes),
      tilde(strip_close),
      IR::Text("}}"),
    ]))
  }
}
impl<'a> Formattable<'a> for Verbatim {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    Ok(f.literal_text(&self.text))
  }
}

impl<'a> Formattable<'a> for Expression {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    match self {
      Expression::Path(path) => Ok(IR::Text(&path.original)),
      Expression::SubExpression(sub_expression) => sub_expression.format(f),
      Expression::String(string) => string.format(f),
      Expression::Number(number) => Ok(f.text(&number.value.to_string())),
      Expression::Boolean(boolean) => Ok(IR::Text(if boolean.value { "true" } else { "false" })),
      Expression::Null(_) => Ok(IR::Text("null")),
      Expression::Undefined(_) => Ok(IR::Text("undefined")),
    }
  }
}
impl<'a> Formattable<'a> for SubExpression {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    let path = self.path.format(f)?;
    let inner = match params(f, &self.params, &self.hash)? {
      Some(params) => f.indent([path, IR::LineOrSpace, f.group([params])]),
      None => path,
    };

    Ok(f.group([IR::Text("("), inner, IR::Line, IR::Text(")")]))
  }
}
impl<'a> Formattable<'a> for StringLiteral {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    // inside an attribute value, use the other quote to the attribute
    let preferred = f.attribute_quote().map_or(Quote::Double, Quote::opposite);
    let quote = preferred_quote([self.value.as_str()], preferred);

    let value = match escape_string(&self.value, quote) {
      Cow::Borrowed(value) => f.literal_text(value),
      Cow::Owned(value) => f.literal_text(f.allocator.alloc_str(&value)),
    };

    Ok(f.concat([IR::Text(quote.as_str()), value, IR::Text(quote.as_str())]))
  }
}
impl<'a> Formattable<'a> for Hash {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    let mut pairs = Vec::with_capacity_in(self.pairs.len(), f.allocator);
    for pair in &self.pairs {
      pairs.push(pair.format(f)?);
    }

    Ok(f.join(pairs, || IR::LineOrSpace))
  }
}
impl<'a> Formattable<'a> for HashPair {
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError> {
    Ok(f.concat([IR::Text(&self.key), IR::Text("="), self.value.format(f)?]))
  }
}
