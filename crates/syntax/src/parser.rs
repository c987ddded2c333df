use crate::{
  ast::{expression::*, statement::*},
  span::Span,
  tokeniser::{Token, TokenKind, Tokeniser},
};
use std::{error, fmt};
use thin_vec::{ThinVec, thin_vec};

/// Why a run of content stopped
#[derive(Debug)]
enum Terminator {
  /// The end of the source was reached
  EndOfFile,
  /// A closing tag, e.g. `</div>`
  ElementClose { name: String, span: Span },
  /// An else tag, e.g. `{{else}}`, `{{^}}`, `{{else if x}}`
  Else {
    strip: StripFlags,
    chained: Option<OpenBlock>,
    span: Span,
  },
  /// A closing block tag, e.g. `{{/if}}`
  BlockClose {
    path: PathExpression,
    strip: StripFlags,
    span: Span,
  },
}
impl Terminator {
  fn span(&self) -> Option<Span> {
    match self {
      Self::EndOfFile => None,
      Self::ElementClose { span, .. }
      | Self::Else { span, .. }
      | Self::BlockClose { span, .. } => Some(*span),
    }
  }
}

/// The opening tag of a block, e.g. `{{#each items as |item|}}`
#[derive(Debug)]
struct OpenBlock {
  kind: BlockKind,
  path: PathExpression,
  params: ThinVec<Expression>,
  hash: Hash,
  block_params: ThinVec<String>,
  strip: StripFlags,
  span: Span,
}

/// A statement started by `{{`
enum Statement {
  Node(Node),
  Open(OpenBlock),
  Terminator(Terminator),
}

/// The callee and arguments of a mustache
struct Call {
  path: Expression,
  params: ThinVec<Expression>,
  hash: Hash,
  block_params: ThinVec<String>,
}

pub struct Parser<'source> {
  /// The source code being parsed
  source: &'source str,
  /// The bytes of the source code
  bytes: &'source [u8],
  /// The current byte offset
  position: usize,
  /// Errors found so far
  errors: Vec<ParseError>,
}
impl<'source> Parser<'source> {
  /// # Panics
  /// Panics if the length of the source code is greater than `u32::MAX`
  pub fn new(source: &'source str) -> Self {
    assert!(source.len() < u32::MAX as usize);

    Self {
      source,
      bytes: source.as_bytes(),
      position: 0,
      errors: Vec::new(),
    }
  }

  pub fn parse(mut self) -> (Template, Vec<ParseError>) {
    let mut body = ThinVec::new();

    loop {
      let (nodes, terminator) = self.parse_content();
      body.extend(nodes);

      match terminator {
        Terminator::EndOfFile => break,
        Terminator::ElementClose { name, span } => {
          self.add_error(ParseError::UnexpectedClosingTag { tag: name, span });
        }
        Terminator::BlockClose { path, span, .. } => {
          self.add_error(ParseError::UnexpectedBlockClose {
            path: path.original,
            span,
          });
        }
        Terminator::Else { span, .. } => self.add_error(ParseError::UnexpectedElse(span)),
      }
    }

    let template = Template {
      body,
      span: Span::from_offsets(0, self.source.len()),
    };
    (template, self.errors)
  }

  fn add_error(&mut self, error: ParseError) {
    log::debug!("parse error at {:?}: {}", error.span(), error.title());
    self.errors.push(error);
  }

  fn is_end(&self) -> bool {
    self.position >= self.bytes.len()
  }

  fn starts_with(&self, pattern: &str) -> bool {
    self.bytes[self.position..].starts_with(pattern.as_bytes())
  }

  fn byte(&self, offset: usize) -> Option<u8> {
    self.bytes.get(self.position + offset).copied()
  }

  fn skip_whitespace(&mut self) {
    while self.byte(0).is_some_and(|c| c.is_ascii_whitespace()) {
      self.position += 1;
    }
  }

  fn span_from(&self, start: usize) -> Span {
    Span::from_offsets(start, self.position)
  }

  /// Find the offset of the next occurrence of a pattern, from the current position
  fn find(&self, pattern: &str) -> Option<usize> {
    self.source[self.position..]
      .find(pattern)
      .map(|offset| self.position + offset)
  }

  /// Move to just after the next `}}`, or the end of the file if there is none
  fn resync_mustache(&mut self) {
    log::debug!("skipping to the end of the mustache at {}", self.position);
    self.position = self.find("}}").map_or(self.bytes.len(), |end| end + 2);
  }

  /// Parse content until the end of the file or a closing tag
  fn parse_content(&mut self) -> (ThinVec<Node>, Terminator) {
    let mut nodes = ThinVec::new();

    loop {
      if self.is_end() {
        return (nodes, Terminator::EndOfFile);
      }

      if self.starts_with("{{") {
        match self.parse_statement() {
          Statement::Node(node) => nodes.push(node),
          Statement::Open(open) => nodes.push(self.parse_block(open)),
          Statement::Terminator(terminator) => return (nodes, terminator),
        }
      } else if self.starts_with("<!--") {
        nodes.push(Node::Comment(self.parse_comment()));
      } else if self.starts_with("</") && self.byte(2).is_some_and(is_tag_start) {
        return (nodes, self.parse_closing_tag());
      } else if self.byte(0) == Some(b'<') && self.byte(1).is_some_and(is_tag_start) {
        nodes.push(Node::Element(self.parse_element()));
      } else {
        nodes.push(Node::Text(self.parse_text()));
      }
    }
  }

  /// Parse a run of text, until the start of a tag, comment, or mustache
  fn parse_text(&mut self) -> TextNode {
    let start = self.position;
    let mut chars = String::new();
    let mut segment_start = self.position;

    while !self.is_end() {
      if self.starts_with("\\{{") {
        chars.push_str(&self.source[segment_start..self.position]);
        chars.push_str("{{");
        self.position += 3;
        segment_start = self.position;
        continue;
      }

      let at_tag = self.byte(0) == Some(b'<')
        && (self.starts_with("<!--")
          || self.byte(1).is_some_and(is_tag_start)
          || (self.byte(1) == Some(b'/') && self.byte(2).is_some_and(is_tag_start)));
      if self.starts_with("{{") || at_tag {
        break;
      }

      self.position += 1;
    }

    chars.push_str(&self.source[segment_start..self.position]);
    TextNode {
      chars,
      span: self.span_from(start),
    }
  }

  /// Parse an HTML comment, `<!-- text -->`
  fn parse_comment(&mut self) -> CommentStatement {
    let start = self.position;
    self.position += 4;

    let value = if let Some(end) = self.find("-->") {
      let value = self.source[self.position..end].to_owned();
      self.position = end + 3;
      value
    } else {
      let value = self.source[self.position..].to_owned();
      self.position = self.bytes.len();
      self.add_error(ParseError::UnterminatedComment(self.span_from(start)));
      value
    };

    CommentStatement {
      value,
      span: self.span_from(start),
    }
  }

  /// Parse a name of a tag or attribute, up until one of the stop characters
  fn parse_name(&mut self, is_stop: impl Fn(u8) -> bool) -> &'source str {
    let start = self.position;
    while let Some(character) = self.byte(0) {
      if character.is_ascii_whitespace()
        || is_stop(character)
        || (character == b'/' && self.byte(1) == Some(b'>'))
        || self.starts_with("{{")
      {
        break;
      }
      self.position += 1;
    }
    &self.source[start..self.position]
  }

  /// Parse a closing tag, `</div>`
  fn parse_closing_tag(&mut self) -> Terminator {
    let start = self.position;
    self.position += 2;
    let name = self.parse_name(|c| c == b'>').to_owned();
    self.skip_whitespace();

    if self.byte(0) == Some(b'>') {
      self.position += 1;
    } else {
      self.add_error(ParseError::UnterminatedTag(self.span_from(start)));
    }

    Terminator::ElementClose {
      name,
      span: self.span_from(start),
    }
  }

  /// Parse an element, its starting tag, children, and closing tag
  fn parse_element(&mut self) -> ElementNode {
    let start = self.position;
    self.position += 1;
    let tag = self.parse_name(|c| c == b'>').to_owned();

    let mut element = ElementNode {
      tag,
      attributes: ThinVec::new(),
      modifiers: ThinVec::new(),
      comments: ThinVec::new(),
      children: ThinVec::new(),
      self_closing: false,
      span: Span::default(),
    };

    loop {
      self.skip_whitespace();

      if self.is_end() {
        self.add_error(ParseError::UnterminatedTag(self.span_from(start)));
        element.span = self.span_from(start);
        return element;
      } else if self.byte(0) == Some(b'>') {
        self.position += 1;
        break;
      } else if self.starts_with("/>") {
        self.position += 2;
        element.self_closing = true;
        break;
      } else if self.starts_with("{{") {
        self.parse_tag_mustache(&mut element);
      } else {
        let attribute_start = self.position;
        match self.parse_attribute() {
          Some(attribute) => element.attributes.push(attribute),
          None => {
            if self.position == attribute_start {
              let character = self.source[attribute_start..].chars().next();
              self.position += character.map_or(1, char::len_utf8);
            }
            self.add_error(ParseError::InvalidAttribute(self.span_from(attribute_start)));
          }
        }
      }
    }

    if element.self_closing || element.is_void() {
      element.span = self.span_from(start);
      return element;
    }

    loop {
      let (children, terminator) = self.parse_content();
      element.children.extend(children);

      match terminator {
        Terminator::ElementClose { name, .. } if name == element.tag => break,
        Terminator::ElementClose { name, span } => {
          self.add_error(ParseError::MismatchedClosingTag {
            expected: element.tag.clone(),
            found: name,
            span,
          });
          self.position = span.start as usize;
          break;
        }
        Terminator::EndOfFile => {
          self.add_error(ParseError::UnclosedElement {
            tag: element.tag.clone(),
            span: Span::from_offsets(start, start + 1 + element.tag.len()),
          });
          break;
        }
        terminator @ (Terminator::Else { .. } | Terminator::BlockClose { .. }) => {
          self.add_error(ParseError::UnclosedElement {
            tag: element.tag.clone(),
            span: Span::from_offsets(start, start + 1 + element.tag.len()),
          });
          if let Some(span) = terminator.span() {
            self.position = span.start as usize;
          }
          break;
        }
      }
    }

    element.span = self.span_from(start);
    element
  }

  /// Parse a mustache in the attribute region of a tag: a comment, modifier, or grammar gap
  fn parse_tag_mustache(&mut self, element: &mut ElementNode) {
    let start = self.position;
    let sigil_offset = if self.byte(2) == Some(b'~') { 3 } else { 2 };

    match self.byte(sigil_offset) {
      Some(b'!') => {
        self.position += sigil_offset;
        let comment = self.parse_mustache_comment(start);
        element.comments.push(TagComment::Comment(comment));
      }
      Some(b'#' | b'>') => {
        let gap = self.parse_gap();
        element.comments.push(TagComment::Gap(gap));
      }
      _ if self.starts_with("{{{") => {
        self.resync_mustache();
        self.add_error(ParseError::UnsupportedSyntax {
          construct: "triple curly modifier",
          span: self.span_from(start),
        });
      }
      _ => {
        self.position += 2;
        let open = self.eat(b'~');
        let call = self.parse_call();
        let close = self.parse_close(start, false);

        element.modifiers.push(ElementModifierStatement {
          path: call.path,
          params: call.params,
          hash: call.hash,
          strip: StripFlags { open, close },
          span: self.span_from(start),
        });
      }
    }
  }

  /// Parse an attribute, `name`, `name=value`, `name="value"`, `name={{value}}`
  fn parse_attribute(&mut self) -> Option<AttrNode> {
    let start = self.position;
    let name = self.parse_name(|c| matches!(c, b'=' | b'>' | b'"' | b'\'')).to_owned();
    if name.is_empty() {
      return None;
    }

    let name_end = self.position;
    self.skip_whitespace();

    if self.byte(0) != Some(b'=') {
      self.position = name_end;
      let value = AttrValue::Text(TextNode {
        chars: String::new(),
        span: Span::from_offsets(name_end, name_end),
      });
      return Some(AttrNode {
        name,
        value,
        span: self.span_from(start),
      });
    }

    self.position += 1;
    self.skip_whitespace();

    let value = match self.byte(0)? {
      quote @ (b'"' | b'\'') => self.parse_quoted_value(quote),
      _ if self.starts_with("{{") => {
        let sigil_offset = if self.byte(2) == Some(b'~') { 3 } else { 2 };
        if matches!(self.byte(sigil_offset), Some(b'!' | b'#' | b'>' | b'/' | b'^')) {
          return None;
        }
        AttrValue::Mustache(self.parse_mustache())
      }
      _ => {
        let value_start = self.position;
        let chars = self.parse_name(|c| matches!(c, b'>' | b'"' | b'\'' | b'=')).to_owned();
        if chars.is_empty() || self.starts_with("{{") {
          return None;
        }
        AttrValue::Text(TextNode {
          chars,
          span: self.span_from(value_start),
        })
      }
    };

    Some(AttrNode {
      name,
      value,
      span: self.span_from(start),
    })
  }

  /// Parse a quoted attribute value, which may contain mustaches
  fn parse_quoted_value(&mut self, quote: u8) -> AttrValue {
    let start = self.position;
    self.position += 1;

    let mut parts = ThinVec::new();
    let mut text = String::new();
    let mut text_start = self.position;
    let mut segment_start = self.position;

    loop {
      if self.is_end() {
        self.add_error(ParseError::UnterminatedAttributeValue(self.span_from(start)));
        break;
      }

      if self.byte(0) == Some(quote) {
        break;
      } else if self.starts_with("\\{{") {
        text.push_str(&self.source[segment_start..self.position]);
        text.push_str("{{");
        self.position += 3;
        segment_start = self.position;
      } else if self.starts_with("{{") {
        text.push_str(&self.source[segment_start..self.position]);
        if !text.is_empty() {
          parts.push(ConcatPart::Text(TextNode {
            chars: std::mem::take(&mut text),
            span: Span::from_offsets(text_start, self.position),
          }));
        }

        let sigil_offset = if self.byte(2) == Some(b'~') { 3 } else { 2 };
        match self.byte(sigil_offset) {
          Some(b'#' | b'>') => parts.push(ConcatPart::Gap(self.parse_gap())),
          Some(b'!') => {
            let comment_start = self.position;
            self.resync_mustache();
            self.add_error(ParseError::UnsupportedSyntax {
              construct: "comment in attribute value",
              span: self.span_from(comment_start),
            });
          }
          _ => parts.push(ConcatPart::Mustache(self.parse_mustache())),
        }

        text_start = self.position;
        segment_start = self.position;
      } else {
        self.position += 1;
      }
    }

    text.push_str(&self.source[segment_start..self.position]);
    if !text.is_empty() {
      parts.push(ConcatPart::Text(TextNode {
        chars: text,
        span: Span::from_offsets(text_start, self.position),
      }));
    }

    if !self.is_end() {
      self.position += 1;
    }
    let span = self.span_from(start);

    match parts.as_slice() {
      [] => AttrValue::Text(TextNode {
        chars: String::new(),
        span,
      }),
      [ConcatPart::Text(text)] => AttrValue::Text(TextNode {
        chars: text.chars.clone(),
        span,
      }),
      _ => AttrValue::Concat(ConcatStatement { parts, span }),
    }
  }

  /// Capture a block or partial in a position which can't hold it, as raw source
  fn parse_gap(&mut self) -> GrammarGap {
    let start = self.position;
    let sigil_offset = if self.byte(2) == Some(b'~') { 3 } else { 2 };
    let kind = if self.byte(sigil_offset) == Some(b'>') {
      GapKind::Partial
    } else {
      GapKind::Block
    };

    let mut depth = 0_usize;
    loop {
      if !self.starts_with("{{") {
        match self.find("{{") {
          Some(next) => self.position = next,
          None => {
            self.position = self.bytes.len();
            self.add_error(ParseError::UnclosedBlock {
              path: String::new(),
              span: Span::from_offsets(start, start + 2),
            });
            break;
          }
        }
      }

      let offset = if self.byte(2) == Some(b'~') { 3 } else { 2 };
      let sigil = self.byte(offset);
      if sigil == Some(b'!') {
        self.position += offset;
        self.parse_mustache_comment(self.position - offset);
        continue;
      }

      self.resync_mustache();
      match sigil {
        Some(b'#') => depth += 1,
        Some(b'/') => depth = depth.saturating_sub(1),
        _ => {}
      }
      if depth == 0 || self.is_end() {
        break;
      }
    }

    log::debug!("captured {kind:?} in an unsupported position at {start}");
    GrammarGap {
      kind,
      text: self.source[start..self.position].to_owned(),
      span: self.span_from(start),
    }
  }

  /// Consume the byte if it is next
  fn eat(&mut self, byte: u8) -> bool {
    if self.byte(0) == Some(byte) {
      self.position += 1;
      true
    } else {
      false
    }
  }

  /// Is the next non-whitespace text the `else` keyword?
  fn at_else_keyword(&self) -> Option<usize> {
    let mut offset = 0;
    while self.byte(offset).is_some_and(|c| c.is_ascii_whitespace()) {
      offset += 1;
    }

    let keyword_end = self.position + offset + 4;
    let is_else = self.bytes[self.position + offset..].starts_with(b"else")
      && self
        .bytes
        .get(keyword_end)
        .is_none_or(|c| c.is_ascii_whitespace() || matches!(c, b'~' | b'}'));

    is_else.then_some(keyword_end)
  }

  /// Parse a statement starting with `{{`
  fn parse_statement(&mut self) -> Statement {
    let start = self.position;

    if self.starts_with("{{{") {
      return Statement::Node(Node::Mustache(self.parse_mustache()));
    }

    self.position += 2;
    let open = self.eat(b'~');

    match self.byte(0) {
      Some(b'!') => Statement::Node(Node::MustacheComment(self.parse_mustache_comment(start))),
      Some(b'#') if self.byte(1) == Some(b'>') => {
        self.position += 2;
        Statement::Open(self.parse_open_block(start, open, BlockKind::Partial))
      }
      Some(b'#') if self.byte(1) == Some(b'*') => self.parse_unsupported(start, "decorator"),
      Some(b'#') => {
        self.position += 1;
        Statement::Open(self.parse_open_block(start, open, BlockKind::Helper))
      }
      Some(b'/') => {
        self.position += 1;
        let path = self.parse_block_path();
        let close = self.parse_close(start, false);

        Statement::Terminator(Terminator::BlockClose {
          path,
          strip: StripFlags { open, close },
          span: self.span_from(start),
        })
      }
      Some(b'>') => {
        self.position += 1;
        let call = self.parse_call();
        let close = self.parse_close(start, false);

        Statement::Node(Node::Partial(PartialStatement {
          name: call.path,
          params: call.params,
          hash: call.hash,
          strip: StripFlags { open, close },
          span: self.span_from(start),
        }))
      }
      Some(b'^') => {
        let after = self.position + 1;
        let rest = self.source[after..].trim_start();
        if rest.starts_with("}}") || rest.starts_with("~}}") {
          self.position = after;
          let close = self.parse_close(start, false);
          Statement::Terminator(Terminator::Else {
            strip: StripFlags { open, close },
            chained: None,
            span: self.span_from(start),
          })
        } else {
          self.parse_unsupported(start, "inverse section")
        }
      }
      Some(b'&') => self.parse_unsupported(start, "unescaped ampersand mustache"),
      _ => {
        if let Some(keyword_end) = self.at_else_keyword() {
          self.position = keyword_end;
          return Statement::Terminator(self.parse_else(start, open));
        }

        self.position = start;
        Statement::Node(Node::Mustache(self.parse_mustache()))
      }
    }
  }

  /// Skip over a mustache which uses syntax that isn't supported
  fn parse_unsupported(&mut self, start: usize, construct: &'static str) -> Statement {
    self.resync_mustache();
    let span = self.span_from(start);
    self.add_error(ParseError::UnsupportedSyntax { construct, span });

    Statement::Node(Node::Verbatim(Verbatim {
      text: span.source_text(self.source).to_owned(),
      span,
    }))
  }

  /// Parse the rest of an else tag, which may start a chained block, `{{else if x}}`
  fn parse_else(&mut self, start: usize, open: bool) -> Terminator {
    let next = self.peek();
    if matches!(next.kind, TokenKind::Close | TokenKind::Tilde) {
      let close = self.parse_close(start, false);
      return Terminator::Else {
        strip: StripFlags { open, close },
        chained: None,
        span: self.span_from(start),
      };
    }

    let chained = self.parse_open_block(start, open, BlockKind::Helper);
    Terminator::Else {
      strip: chained.strip,
      span: chained.span,
      chained: Some(chained),
    }
  }

  /// Parse the rest of the opening tag of a block, after the sigil
  fn parse_open_block(&mut self, start: usize, open: bool, kind: BlockKind) -> OpenBlock {
    let call = self.parse_call();
    let close = self.parse_close(start, false);

    let path = match call.path {
      Expression::Path(path) => path,
      other => {
        self.add_error(ParseError::ExpectedPath(other.span()));
        PathExpression::new("", other.span())
      }
    };

    OpenBlock {
      kind,
      path,
      params: call.params,
      hash: call.hash,
      block_params: call.block_params,
      strip: StripFlags { open, close },
      span: self.span_from(start),
    }
  }

  /// Parse a block from after its opening tag, up to and including its closing tag
  fn parse_block(&mut self, open: OpenBlock) -> Node {
    let start = open.span.start as usize;
    let (mut block, terminator) = self.parse_block_branches(open);

    match terminator {
      Terminator::BlockClose { path, strip, span } => {
        if path.original != block.path.original {
          self.add_error(ParseError::MismatchedBlockClose {
            expected: block.path.original.clone(),
            found: path.original,
            span,
          });
        }
        block.close_strip = strip;
      }
      Terminator::EndOfFile => {
        self.add_error(ParseError::UnclosedBlock {
          path: block.path.original.clone(),
          span: block.span,
        });
      }
      terminator @ (Terminator::ElementClose { .. } | Terminator::Else { .. }) => {
        self.add_error(ParseError::UnclosedBlock {
          path: block.path.original.clone(),
          span: block.span,
        });
        if let Some(span) = terminator.span() {
          self.position = span.start as usize;
        }
      }
    }
    block.span = self.span_from(start);

    match block.kind {
      BlockKind::Helper => Node::Block(block),
      BlockKind::Partial => {
        if let Some(inverse) = &block.inverse {
          self.add_error(ParseError::UnsupportedSyntax {
            construct: "else in partial block",
            span: inverse.span,
          });
        }

        Node::PartialBlock(PartialBlockStatement {
          name: block.path,
          params: block.params,
          hash: block.hash,
          program: block.program,
          open_strip: block.open_strip,
          close_strip: block.close_strip,
          span: block.span,
        })
      }
    }
  }

  /// Parse the program and any inverse of a block, returning the terminator which ended it
  ///
  /// A chained else (`{{else if x}}`) becomes an inverse holding a single block, which
  /// shares the closing tag of the outer block.
  fn parse_block_branches(&mut self, open: OpenBlock) -> (BlockStatement, Terminator) {
    let program_start = self.position;
    let (body, terminator) = self.parse_content();

    let mut block = BlockStatement {
      kind: open.kind,
      path: open.path,
      params: open.params,
      hash: open.hash,
      program: Program {
        body,
        block_params: open.block_params,
        span: Span::from_offsets(program_start, self.terminator_start(&terminator)),
      },
      inverse: None,
      open_strip: open.strip,
      inverse_strip: StripFlags::default(),
      close_strip: StripFlags::default(),
      span: open.span,
    };

    let Terminator::Else {
      strip,
      chained,
      span,
    } = terminator
    else {
      return (block, terminator);
    };
    block.inverse_strip = strip;

    let terminator = if let Some(chained) = chained {
      let chained_start = chained.span.start as usize;
      let (mut inner, terminator) = self.parse_block_branches(chained);
      inner.span = Span::from_offsets(chained_start, self.terminator_start(&terminator));
      if let Terminator::BlockClose { strip, .. } = &terminator {
        inner.close_strip = *strip;
      }

      block.inverse = Some(Program {
        span: inner.span,
        body: thin_vec![Node::Block(inner)],
        block_params: ThinVec::new(),
      });
      terminator
    } else {
      let inverse_start = span.end as usize;
      let mut body = ThinVec::new();
      let terminator = loop {
        let (nodes, terminator) = self.parse_content();
        body.extend(nodes);

        match terminator {
          Terminator::Else { span, .. } => self.add_error(ParseError::UnexpectedElse(span)),
          terminator => break terminator,
        }
      };

      block.inverse = Some(Program {
        body,
        block_params: ThinVec::new(),
        span: Span::from_offsets(inverse_start, self.terminator_start(&terminator)),
      });
      terminator
    };

    (block, terminator)
  }

  /// Where the content ended by a terminator finishes
  fn terminator_start(&self, terminator: &Terminator) -> usize {
    terminator.span().map_or(self.position, |span| span.start as usize)
  }

  /// Parse the path in a closing block tag
  fn parse_block_path(&mut self) -> PathExpression {
    let token = self.peek();
    if token.kind == TokenKind::Path {
      self.advance();
      PathExpression::new(self.token_text(token), token.into())
    } else {
      self.add_error(ParseError::ExpectedPath(token.into()));
      PathExpression::new("", Span::empty(token.start))
    }
  }

  /// Parse a template comment, from the `!`
  fn parse_mustache_comment(&mut self, start: usize) -> MustacheCommentStatement {
    self.position += 1;
    let long = self.starts_with("--");
    if long {
      self.position += 2;
    }
    let value_start = self.position;

    let value_end = if long {
      let mut search = self.position;
      loop {
        match self.source[search..].find("--") {
          Some(offset) => {
            let dashes = search + offset;
            let rest = &self.source[dashes + 2..];
            if rest.starts_with("}}") {
              self.position = dashes + 4;
              break Some(dashes);
            } else if rest.starts_with("~}}") {
              self.position = dashes + 5;
              break Some(dashes);
            }
            search = dashes + 1;
          }
          None => break None,
        }
      }
    } else {
      self.find("}}").map(|end| {
        self.position = end + 2;
        if end > value_start && self.bytes[end - 1] == b'~' {
          end - 1
        } else {
          end
        }
      })
    };

    let value = if let Some(end) = value_end {
      self.source[value_start..end].to_owned()
    } else {
      self.position = self.bytes.len();
      self.add_error(ParseError::UnterminatedComment(self.span_from(start)));
      self.source[value_start..].to_owned()
    };

    MustacheCommentStatement {
      value,
      span: self.span_from(start),
    }
  }

  /// Parse a mustache, `{{path params hash}}` or `{{{path params hash}}}`
  fn parse_mustache(&mut self) -> MustacheStatement {
    let start = self.position;
    let trusting = self.starts_with("{{{");
    self.position += if trusting { 3 } else { 2 };
    let open = self.eat(b'~');

    let call = self.parse_call();
    if !call.block_params.is_empty() {
      self.add_error(ParseError::UnexpectedBlockParams(self.span_from(start)));
    }
    let close = self.parse_close(start, trusting);

    MustacheStatement {
      path: call.path,
      params: call.params,
      hash: call.hash,
      trusting,
      strip: StripFlags { open, close },
      span: self.span_from(start),
    }
  }

  /// Parse the closing delimiter of a mustache, returning if there is a strip marker
  fn parse_close(&mut self, start: usize, trusting: bool) -> bool {
    let strip = self.peek().kind == TokenKind::Tilde;
    if strip {
      self.advance();
    }

    let token = self.peek();
    if token.kind == TokenKind::Close && (!trusting || self.bytes.get(token.end() as usize) == Some(&b'}')) {
      self.advance();
      if trusting {
        self.position += 1;
      }
    } else if token.kind == TokenKind::EndOfFile {
      self.position = self.bytes.len();
      self.add_error(ParseError::UnterminatedMustache(self.span_from(start)));
    } else {
      self.add_error(ParseError::Expected {
        expected: TokenKind::Close,
        found: token,
      });
      self.resync_mustache();
      if trusting {
        self.eat(b'}');
      }
    }

    strip
  }

  /// Look at the next token, without consuming it
  fn peek(&self) -> Token {
    Tokeniser::new(self.source, self.position)
      .next()
      .unwrap_or_default()
  }

  /// Look at the token after the next token
  fn peek_second(&self) -> Token {
    Tokeniser::new(self.source, self.position)
      .nth(1)
      .unwrap_or_default()
  }

  /// Consume the next token
  fn advance(&mut self) -> Token {
    let token = self.peek();
    self.position = token.end() as usize;
    token
  }

  fn token_text(&self, token: Token) -> &'source str {
    Span::from(token).source_text(self.source)
  }

  /// Does the next token start named arguments, `key=`?
  fn at_hash_pair(&self) -> bool {
    self.peek().kind == TokenKind::Path && self.peek_second().kind == TokenKind::Equal
  }

  /// Does the next token start block parameters, `as |`?
  fn at_block_params(&self) -> bool {
    let token = self.peek();
    token.kind == TokenKind::Path
      && self.token_text(token) == "as"
      && self.peek_second().kind == TokenKind::Pipe
  }

  /// Parse the callee and arguments of a mustache or sub-expression
  fn parse_call(&mut self) -> Call {
    let path = self.parse_expression().unwrap_or_else(|| {
      let position = Span::from_offsets(self.position, self.position);
      Expression::Path(PathExpression::new("", position))
    });

    let mut params = ThinVec::new();
    let mut hash = Hash::default();
    let mut block_params = ThinVec::new();

    loop {
      let token = self.peek();
      match token.kind {
        TokenKind::Close
        | TokenKind::Tilde
        | TokenKind::RightParen
        | TokenKind::Pipe
        | TokenKind::EndOfFile => break,
        _ if self.at_block_params() => {
          block_params = self.parse_block_params();
          break;
        }
        _ if self.at_hash_pair() => {
          let pair = self.parse_hash_pair();
          hash.span = hash.span.merge(pair.span);
          hash.pairs.push(pair);
        }
        _ => {
          if let Some(param) = self.parse_expression() {
            if !hash.is_empty() {
              self.add_error(ParseError::PositionalAfterNamed(param.span()));
            }
            params.push(param);
          }
        }
      }
    }

    Call {
      path,
      params,
      hash,
      block_params,
    }
  }

  /// Parse a named argument, `key=value`
  fn parse_hash_pair(&mut self) -> HashPair {
    let key = self.advance();
    self.advance();

    let value = self.parse_expression().unwrap_or_else(|| {
      let position = Span::from_offsets(self.position, self.position);
      Expression::Path(PathExpression::new("", position))
    });

    HashPair {
      key: self.token_text(key).to_owned(),
      span: Span::from(key).merge(value.span()),
      value,
    }
  }

  /// Parse block parameters, `as |a b|`
  fn parse_block_params(&mut self) -> ThinVec<String> {
    self.advance();
    self.advance();

    let mut names = ThinVec::new();
    loop {
      let token = self.peek();
      match token.kind {
        TokenKind::Pipe => {
          self.advance();
          break;
        }
        TokenKind::Path => {
          self.advance();
          names.push(self.token_text(token).to_owned());
        }
        _ => {
          self.add_error(ParseError::Expected {
            expected: TokenKind::Pipe,
            found: token,
          });
          break;
        }
      }
    }

    names
  }

  /// Parse a single expression, consuming at least one token
  fn parse_expression(&mut self) -> Option<Expression> {
    let token = self.peek();
    let span = Span::from(token);
    let text = self.token_text(token);

    let expression = match token.kind {
      TokenKind::Path => Expression::Path(PathExpression::new(text, span)),
      TokenKind::String => Expression::String(StringLiteral {
        value: unescape_string(text),
        span,
      }),
      TokenKind::Number => match text.parse() {
        Ok(value) => Expression::Number(NumberLiteral { value, span }),
        Err(_) => Expression::Path(PathExpression::new(text, span)),
      },
      TokenKind::True => Expression::Boolean(BooleanLiteral { value: true, span }),
      TokenKind::False => Expression::Boolean(BooleanLiteral { value: false, span }),
      TokenKind::Null => Expression::Null(NullLiteral { span }),
      TokenKind::Undefined => Expression::Undefined(UndefinedLiteral { span }),
      TokenKind::LeftParen => {
        self.advance();
        return Some(self.parse_sub_expression(token));
      }
      TokenKind::Close | TokenKind::EndOfFile => {
        self.add_error(ParseError::ExpectedExpression(token));
        return None;
      }
      TokenKind::Unknown => {
        self.advance();
        self.add_error(ParseError::UnknownCharacter(token));
        return None;
      }
      TokenKind::UnterminatedString => {
        self.advance();
        self.add_error(ParseError::UnterminatedString(token));
        return None;
      }
      TokenKind::UnterminatedSegment => {
        self.advance();
        self.add_error(ParseError::UnterminatedSegment(token));
        return None;
      }
      TokenKind::Tilde
      | TokenKind::RightParen
      | TokenKind::Equal
      | TokenKind::Pipe => {
        self.advance();
        self.add_error(ParseError::ExpectedExpression(token));
        return None;
      }
    };

    self.advance();
    Some(expression)
  }

  /// Parse a sub-expression, after the opening parenthesis
  fn parse_sub_expression(&mut self, open: Token) -> Expression {
    let call = self.parse_call();
    if !call.block_params.is_empty() {
      self.add_error(ParseError::UnexpectedBlockParams(Span::from(open)));
    }

    let close = self.peek();
    if close.kind == TokenKind::RightParen {
      self.advance();
    } else {
      self.add_error(ParseError::Expected {
        expected: TokenKind::RightParen,
        found: close,
      });
    }

    Expression::SubExpression(Box::new(SubExpression {
      path: call.path,
      params: call.params,
      hash: call.hash,
      span: Span::new(open.start, u32::try_from(self.position).unwrap_or(u32::MAX)),
    }))
  }
}

/// Can the byte start a tag name, after `<` or `</`?
fn is_tag_start(character: u8) -> bool {
  character.is_ascii_alphabetic() || matches!(character, b'@' | b':')
}

/// Remove the quotes and escapes from a string token
fn unescape_string(text: &str) -> String {
  let quote = &text[..1];
  let inner = &text[1..text.len() - 1];
  inner.replace(&format!("\\{quote}"), quote)
}

/// An error found whilst parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
  /// Expected a token of a certain kind
  Expected {
    /// Expected Token Kind to be
    expected: TokenKind,
    /// Found this Token instead
    found: Token,
  },
  /// Expected Expression
  ExpectedExpression(Token),
  /// Expected a path, e.g. for the name of a block
  ExpectedPath(Span),
  /// Unknown Character
  UnknownCharacter(Token),

  /// Unterminated String Literal
  UnterminatedString(Token),
  /// Unterminated `[literal segment]`
  UnterminatedSegment(Token),
  /// A mustache without its closing delimiter
  UnterminatedMustache(Span),
  /// A comment without its closing delimiter
  UnterminatedComment(Span),
  /// A starting or closing tag without `>`
  UnterminatedTag(Span),
  /// A quoted attribute value without the closing quote
  UnterminatedAttributeValue(Span),

  /// An element without a closing tag
  UnclosedElement {
    /// The tag name
    tag: String,
    /// The location of the opening tag
    span: Span,
  },
  /// A block without a closing tag
  UnclosedBlock {
    /// The name of the block
    path: String,
    /// The location of the opening tag
    span: Span,
  },
  /// A closing tag without a matching opening tag
  UnexpectedClosingTag {
    /// The tag name
    tag: String,
    /// The location of the closing tag
    span: Span,
  },
  /// A closing tag which doesn't match the open element
  MismatchedClosingTag {
    /// The tag name of the open element
    expected: String,
    /// The tag name which was closed
    found: String,
    /// The location of the closing tag
    span: Span,
  },
  /// A closing block tag which doesn't match the open block
  MismatchedBlockClose {
    /// The name of the open block
    expected: String,
    /// The name which was closed
    found: String,
    /// The location of the closing tag
    span: Span,
  },
  /// A closing block tag without an open block
  UnexpectedBlockClose {
    /// The name which was closed
    path: String,
    /// The location of the closing tag
    span: Span,
  },
  /// An else tag outside of a block
  UnexpectedElse(Span),
  /// Block parameters on something which isn't a block
  UnexpectedBlockParams(Span),
  /// A positional argument after named arguments
  PositionalAfterNamed(Span),
  /// An attribute which couldn't be parsed
  InvalidAttribute(Span),
  /// Syntax which is valid in some template languages, but can't be formatted
  UnsupportedSyntax {
    /// The name of the construct
    construct: &'static str,
    /// The location of the construct
    span: Span,
  },
}
impl ParseError {
  /// The title of the error message
  #[must_use]
  pub fn title(&self) -> String {
    match self {
      Self::Expected { expected, .. } => format!("Expected {expected}"),
      Self::ExpectedExpression(_) => "Expected Expression".into(),
      Self::ExpectedPath(_) => "Expected Path".into(),
      Self::UnknownCharacter(_) => "Unknown Character".into(),
      Self::UnterminatedString(_) => "Unterminated String".into(),
      Self::UnterminatedSegment(_) => "Unterminated Path Segment".into(),
      Self::UnterminatedMustache(_) => "Unterminated Mustache".into(),
      Self::UnterminatedComment(_) => "Unterminated Comment".into(),
      Self::UnterminatedTag(_) => "Unterminated Tag".into(),
      Self::UnterminatedAttributeValue(_) => "Unterminated Attribute Value".into(),
      Self::UnclosedElement { .. } => "Unclosed Element".into(),
      Self::UnclosedBlock { .. } => "Unclosed Block".into(),
      Self::UnexpectedClosingTag { .. } => "Unexpected Closing Tag".into(),
      Self::MismatchedClosingTag { .. } => "Mismatched Closing Tag".into(),
      Self::MismatchedBlockClose { .. } => "Mismatched Block Close".into(),
      Self::UnexpectedBlockClose { .. } => "Unexpected Block Close".into(),
      Self::UnexpectedElse(_) => "Unexpected Else".into(),
      Self::UnexpectedBlockParams(_) => "Unexpected Block Parameters".into(),
      Self::PositionalAfterNamed(_) => "Positional Argument After Named".into(),
      Self::InvalidAttribute(_) => "Invalid Attribute".into(),
      Self::UnsupportedSyntax { .. } => "Unsupported Syntax".into(),
    }
  }

  /// The body of the error message describing what has gone wrong
  #[must_use]
  pub fn message(&self) -> String {
    match self {
      Self::Expected { expected, found } => {
        format!("expected {expected} but got {}", found.kind)
      }
      Self::ExpectedExpression(t) => format!("expected expression but got {}", t.kind),
      Self::ExpectedPath(_) => "expected a path for the name of the block".into(),
      Self::UnknownCharacter(_) => "got unknown character".into(),
      Self::UnterminatedString(_) => "missing closing quote for string".into(),
      Self::UnterminatedSegment(_) => "missing `]` to end the path segment".into(),
      Self::UnterminatedMustache(_) => "missing `}}` to end the mustache".into(),
      Self::UnterminatedComment(_) => "reached the end of the file before the comment ended".into(),
      Self::UnterminatedTag(_) => "missing `>` to end the tag".into(),
      Self::UnterminatedAttributeValue(_) => "missing closing quote for attribute value".into(),
      Self::UnclosedElement { tag, .. } => format!("element `<{tag}>` is never closed"),
      Self::UnclosedBlock { path, .. } => format!("block `{{{{#{path}}}}}` is never closed"),
      Self::UnexpectedClosingTag { tag, .. } => {
        format!("closing tag `</{tag}>` does not have an opening tag")
      }
      Self::MismatchedClosingTag {
        expected, found, ..
      } => format!("expected `</{expected}>` but found `</{found}>`"),
      Self::MismatchedBlockClose {
        expected, found, ..
      } => format!("expected `{{{{/{expected}}}}}` but found `{{{{/{found}}}}}`"),
      Self::UnexpectedBlockClose { path, .. } => {
        format!("closing block `{{{{/{path}}}}}` does not have an opening block")
      }
      Self::UnexpectedElse(_) => "`{{else}}` can only be used inside a block".into(),
      Self::UnexpectedBlockParams(_) => "block parameters can only be declared by a block".into(),
      Self::PositionalAfterNamed(_) => {
        "positional arguments must come before named arguments".into()
      }
      Self::InvalidAttribute(_) => "expected an attribute name and value".into(),
      Self::UnsupportedSyntax { construct, .. } => format!("{construct} is not supported"),
    }
  }

  /// The title and message of the error in a combined string
  #[must_use]
  pub fn full_message(&self) -> String {
    let mut message = self.title();
    message.push('\n');
    message.push_str(&self.message());
    message
  }

  /// The location of the error
  pub fn span(&self) -> Span {
    match self {
      Self::Expected { found: token, .. }
      | Self::ExpectedExpression(token)
      | Self::UnknownCharacter(token)
      | Self::UnterminatedString(token)
      | Self::UnterminatedSegment(token) => Span::from(*token),
      Self::ExpectedPath(span)
      | Self::UnterminatedMustache(span)
      | Self::UnterminatedComment(span)
      | Self::UnterminatedTag(span)
      | Self::UnterminatedAttributeValue(span)
      | Self::UnexpectedElse(span)
      | Self::UnexpectedBlockParams(span)
      | Self::PositionalAfterNamed(span)
      | Self::InvalidAttribute(span)
      | Self::UnclosedElement { span, .. }
      | Self::UnclosedBlock { span, .. }
      | Self::UnexpectedClosingTag { span, .. }
      | Self::MismatchedClosingTag { span, .. }
      | Self::MismatchedBlockClose { span, .. }
      | Self::UnexpectedBlockClose { span, .. }
      | Self::UnsupportedSyntax { span, .. } => *span,
    }
  }
}
impl fmt::Display for ParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message())
  }
}
impl error::Error for ParseError {}
