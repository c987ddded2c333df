use crate::config::{self, Config, Quote, WhitespaceSensitivity};
use crate::error::FormatError;
use bumpalo::{Bump as Allocator, boxed::Box, collections::Vec};
use std::{cell::Cell, fmt, mem};

/// An item which can be formatted
pub trait Formattable<'a> {
  /// Convert the item into the formatting intermediate representation
  ///
  /// # Errors
  /// If the item contains a node which can't be printed
  fn format(&'a self, f: &Formatter<'a>) -> Result<IR<'a>, FormatError>;
}

/// Formatter used to create then print the intermediate formatting representation
pub struct Formatter<'a> {
  pub(crate) config: Config,
  pub(crate) source: &'a str,
  pub(crate) allocator: &'a Allocator,
  /// The quote of the attribute value currently being printed, if inside one
  attribute_quote: Cell<Option<Quote>>,
  /// Inside an element whose text is printed exactly as written, e.g. `<pre>`
  preformatted: Cell<bool>,
}
impl<'a> Formatter<'a> {
  pub(crate) fn new(config: Config, source: &'a str, allocator: &'a Allocator) -> Self {
    Self {
      config,
      source,
      allocator,
      attribute_quote: Cell::new(None),
      preformatted: Cell::new(false),
    }
  }

  /// Format the AST Node into a string
  pub(crate) fn print<T: Formattable<'a>>(&self, item: &'a T) -> Result<String, FormatError> {
    let ir = item.format(self)?;
    Ok(self.render(&ir))
  }

  /// Lay out an IR and print it
  pub(crate) fn render(&self, ir: &IR<'a>) -> String {
    let display_ir = ir.display(0, 0, false, self.config, self.allocator);

    let mut output = String::new();
    display_ir.write(&mut output);

    output.truncate(output.trim_end().len());
    if !output.is_empty() {
      output.push_str(self.config.line_ending.as_str());
    }
    output
  }

  /// The quote of the attribute value currently being printed
  pub(crate) fn attribute_quote(&self) -> Option<Quote> {
    self.attribute_quote.get()
  }

  /// Run a print whilst inside an attribute value using the given quote
  pub(crate) fn with_attribute_quote<T>(&self, quote: Quote, print: impl FnOnce() -> T) -> T {
    let previous = self.attribute_quote.replace(Some(quote));
    let result = print();
    self.attribute_quote.set(previous);
    result
  }

  pub(crate) fn is_preformatted(&self) -> bool {
    self.preformatted.get()
  }

  /// Run a print whilst inside an element whose whitespace must be kept
  pub(crate) fn with_preformatted<T>(&self, print: impl FnOnce() -> T) -> T {
    let previous = self.preformatted.replace(true);
    let result = print();
    self.preformatted.set(previous);
    result
  }

  /// The whitespace mode for the current position, preformatted text never gains line breaks
  pub(crate) fn whitespace_sensitivity(&self) -> WhitespaceSensitivity {
    if self.is_preformatted() {
      WhitespaceSensitivity::Strict
    } else {
      self.config.whitespace_sensitivity
    }
  }

  /// Copy a string into the allocator, so it lives as long as the IR
  pub(crate) fn text(&self, text: &str) -> IR<'a> {
    IR::Text(self.allocator.alloc_str(text))
  }

  /// Text which may span multiple lines, and whose lines are printed without indentation
  pub(crate) fn literal_text(&self, text: &'a str) -> IR<'a> {
    if !text.contains('\n') {
      return IR::Text(text);
    }

    let mut parts = Vec::new_in(self.allocator);
    for (index, line) in text.split('\n').enumerate() {
      if index > 0 {
        parts.push(IR::LiteralLine);
      }
      parts.push(IR::Text(line));
    }
    IR::Concat(parts)
  }

  /// A number of forced line breaks
  pub(crate) fn hardlines(&self, count: usize) -> IR<'a> {
    self.concat_iterator((0..count).map(|_| IR::AlwaysLine))
  }

  /// Create a new indentation node
  pub(crate) fn indent<const N: usize>(&self, ir: [IR<'a>; N]) -> IR<'a> {
    IR::Indent(Box::new_in(self.concat(ir), self.allocator))
  }

  /// Remove a level of indentation from the given IR
  pub(crate) fn dedent(&self, ir: IR<'a>) -> IR<'a> {
    match ir {
      IR::Empty => IR::Empty,
      ir => IR::Dedent(Box::new_in(ir, self.allocator)),
    }
  }

  /// Create a new group, an option for the formatter to break the source on
  pub(crate) fn group<const N: usize>(&self, ir: [IR<'a>; N]) -> IR<'a> {
    IR::Group(Box::new_in(self.concat(ir), self.allocator))
  }

  /// Choose content depending on whether the enclosing group is broken
  pub(crate) fn if_break(&self, broken: IR<'a>, flat: IR<'a>) -> IR<'a> {
    IR::IfBreak(
      Box::new_in(broken, self.allocator),
      Box::new_in(flat, self.allocator),
    )
  }

  /// Merge multiple IRs into a single IR
  pub(crate) fn concat<const N: usize>(&self, mut ir: [IR<'a>; N]) -> IR<'a> {
    match N {
      0 => IR::Empty,
      1 => mem::take(&mut ir[0]),
      _ => IR::Concat(Vec::from_iter_in(ir, self.allocator)),
    }
  }

  /// Merge multiple IRs together from an iterator
  pub(crate) fn concat_iterator(&self, ir: impl Iterator<Item = IR<'a>>) -> IR<'a> {
    IR::Concat(Vec::from_iter_in(ir, self.allocator))
  }

  /// Merge IRs together, with a separator between each
  pub(crate) fn join(
    &self,
    ir: impl IntoIterator<Item = IR<'a>>,
    separator: impl Fn() -> IR<'a>,
  ) -> IR<'a> {
    let mut parts = Vec::new_in(self.allocator);
    for (index, item) in ir.into_iter().enumerate() {
      if index > 0 {
        parts.push(separator());
      }
      parts.push(item);
    }
    IR::Concat(parts)
  }
}

/// Representation of part of a file to be formatted
#[derive(Default)]
pub enum IR<'a> {
  /// No content
  #[default]
  Empty,
  /// String content (up to a single line)
  Text(&'a str),
  /// A possible line break, or nothing
  Line,
  /// Always a line break
  AlwaysLine,
  /// A possible line break, or a space
  LineOrSpace,
  /// Always a line break, with no indentation after it
  LiteralLine,
  /// A combination of multiple IRs
  Concat(Vec<'a, IR<'a>>),
  /// Indent the given IR, if a line break present
  Indent(Box<'a, IR<'a>>),
  /// Remove a level of indentation from the given IR
  Dedent(Box<'a, IR<'a>>),
  /// Mark a section where there are different options to break source code
  Group(Box<'a, IR<'a>>),
  /// Content if the enclosing group is broken, and content if it is flat
  IfBreak(Box<'a, IR<'a>>, Box<'a, IR<'a>>),
  /// Alternating content and separators, separators only break when needed
  Fill(Vec<'a, IR<'a>>),
}
impl<'a> IR<'a> {
  /// Check if the IR has any forced line breaks, so any enclosing group must break
  fn has_always_line(&self) -> bool {
    match self {
      IR::AlwaysLine | IR::LiteralLine => true,
      IR::Empty | IR::Text(_) | IR::LineOrSpace | IR::Line => false,
      IR::Concat(x) | IR::Fill(x) => x.iter().any(IR::has_always_line),
      IR::Indent(ir) | IR::Dedent(ir) | IR::Group(ir) => ir.has_always_line(),
      IR::IfBreak(broken, flat) => broken.has_always_line() || flat.has_always_line(),
    }
  }

  /// Convert the IR into a displayable form
  fn display(
    &self,
    line_length: usize,
    indentation: u16,
    flatten: bool,
    config: Config,
    allocator: &'a Allocator,
  ) -> DisplayIR<'a> {
    match self {
      IR::Empty => DisplayIR::Empty,
      IR::Text(text) => DisplayIR::Text(text),

      IR::LineOrSpace if flatten => DisplayIR::Text(" "),
      IR::Line if flatten => DisplayIR::Empty,
      IR::Line | IR::AlwaysLine | IR::LineOrSpace => DisplayIR::Line {
        depth: indentation,
        indentation: config.indentation,
        line_ending: config.line_ending,
        literal: false,
      },
      IR::LiteralLine => DisplayIR::Line {
        depth: 0,
        indentation: config.indentation,
        line_ending: config.line_ending,
        literal: true,
      },

      IR::Indent(ir) => ir.display(line_length, indentation + 1, flatten, config, allocator),
      IR::Dedent(ir) => ir.display(
        line_length,
        indentation.saturating_sub(1),
        flatten,
        config,
        allocator,
      ),
      IR::Concat(items) => DisplayIR::Collection({
        let mut collection = Vec::new_in(allocator);
        let mut line_length = line_length;

        for ir in items {
          let ir = ir.display(line_length, indentation, flatten, config, allocator);
          line_length = ir.next_line_length(line_length);
          collection.push(ir);
        }
        collection
      }),
      IR::Group(ir) if flatten => ir.display(line_length, indentation, true, config, allocator),
      IR::Group(ir) => ir.display_group(line_length, indentation, config, allocator),
      IR::IfBreak(_, flat) if flatten => {
        flat.display(line_length, indentation, true, config, allocator)
      }
      IR::IfBreak(broken, _) => broken.display(line_length, indentation, false, config, allocator),
      IR::Fill(items) => DisplayIR::Collection({
        let mut collection = Vec::new_in(allocator);
        let mut line_length = line_length;

        for (index, ir) in items.iter().enumerate() {
          let ir = if flatten {
            ir.display(line_length, indentation, true, config, allocator)
          } else if index % 2 == 0 {
            ir.display_group(line_length, indentation, config, allocator)
          } else {
            let separator = ir.display(line_length, indentation, true, config, allocator);
            let next_fits = items.get(index + 1).is_none_or(|next| {
              let after_separator = line_length + separator.len();
              !next.has_always_line()
                && next
                  .display(after_separator, indentation, true, config, allocator)
                  .fits(config.print_width, after_separator)
            });

            if next_fits {
              separator
            } else {
              ir.display(line_length, indentation, false, config, allocator)
            }
          };

          line_length = ir.next_line_length(line_length);
          collection.push(ir);
        }
        collection
      }),
    }
  }

  /// Display flat if it fits and has no forced breaks, otherwise broken
  fn display_group(
    &self,
    line_length: usize,
    indentation: u16,
    config: Config,
    allocator: &'a Allocator,
  ) -> DisplayIR<'a> {
    if !self.has_always_line() {
      let flat = self.display(line_length, indentation, true, config, allocator);
      if flat.fits(config.print_width, line_length) {
        return flat;
      }
    }

    self.display(line_length, indentation, false, config, allocator)
  }
}
impl fmt::Debug for IR<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Empty => write!(f, "Empty"),
      Self::Text(text) => write!(f, "Text '{text}'"),
      Self::LineOrSpace => write!(f, "Line"),
      Self::Line => write!(f, "OptionalLine"),
      Self::AlwaysLine => write!(f, "ForcedLine"),
      Self::LiteralLine => write!(f, "LiteralLine"),
      Self::Concat(items) => f.debug_list().entries(items).finish(),
      Self::Indent(ir) => f.debug_tuple("Indent").field(ir).finish(),
      Self::Dedent(ir) => f.debug_tuple("Dedent").field(ir).finish(),
      Self::Group(ir) => f.debug_tuple("Group").field(ir).finish(),
      Self::IfBreak(broken, flat) => f.debug_tuple("IfBreak").field(broken).field(flat).finish(),
      Self::Fill(items) => f.debug_tuple("Fill").field(items).finish(),
    }
  }
}

/// Final representation which can directly be printed
/// Created so length of current line (and possible variants) can be calculated
#[derive(Debug)]
enum DisplayIR<'a> {
  Empty,
  Text(&'a str),
  Line {
    depth: u16,
    indentation: config::Indentation,
    line_ending: config::LineEnding,
    literal: bool,
  },
  Collection(Vec<'a, DisplayIR<'a>>),
}
impl DisplayIR<'_> {
  /// Will the display item fit in the given size?
  fn fits(&self, max_width: u16, current_length: usize) -> bool {
    current_length.saturating_add(self.len()) <= usize::from(max_width)
  }

  /// The length of the display item up to its first line break
  fn len(&self) -> usize {
    match self {
      DisplayIR::Empty | DisplayIR::Line { .. } => 0,
      DisplayIR::Text(text) => text.chars().count(),
      DisplayIR::Collection(items) => {
        let mut length = 0;
        for item in items {
          length += item.len();
          if item.contains_line() {
            break;
          }
        }
        length
      }
    }
  }

  /// The length of the display item on the final line
  fn end_len(&self) -> usize {
    match self {
      DisplayIR::Empty => 0,
      DisplayIR::Text(text) => text.chars().count(),
      DisplayIR::Line {
        depth, indentation, ..
      } => indentation.len() * usize::from(*depth),
      DisplayIR::Collection(items) => {
        let mut length = 0;
        for item in items.iter().rev() {
          length += item.end_len();
          if item.contains_line() {
            break;
          }
        }
        length
      }
    }
  }

  /// The length of the current line after this item is printed
  fn next_line_length(&self, line_length: usize) -> usize {
    if self.contains_line() {
      self.end_len()
    } else {
      line_length + self.len()
    }
  }

  /// Does the current display item contain a line?
  fn contains_line(&self) -> bool {
    match self {
      DisplayIR::Line { .. } => true,
      DisplayIR::Collection(x) => x.iter().any(DisplayIR::contains_line),
      DisplayIR::Empty | DisplayIR::Text(_) => false,
    }
  }

  /// Print the item, removing trailing whitespace from lines
  fn write(&self, output: &mut String) {
    match self {
      Self::Empty => {}
      Self::Text(text) => output.push_str(text),
      Self::Line {
        depth,
        indentation,
        line_ending,
        literal,
      } => {
        if !literal {
          output.truncate(output.trim_end_matches([' ', '\t']).len());
        }
        output.push_str(line_ending.as_str());
        indentation.push_to(output, *depth);
      }
      Self::Collection(x) => x.iter().for_each(|item| item.write(output)),
    }
  }
}
