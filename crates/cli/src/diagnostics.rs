use curly_formatter::FormatError;
use curly_syntax::{LineIndex, ParseError, Span, TokenKind, tokenise};
use owo_colors::{OwoColorize, Style};
use std::fmt;

#[derive(Debug)]
pub enum Severity {
  Error,
  Warning,
}
pub struct Message {
  pub title: String,
  pub body: String,
  pub hint: Option<String>,
  pub severity: Severity,
}
impl Message {
  pub fn error(message: String) -> Self {
    Self {
      title: message,
      body: String::new(),
      hint: None,
      severity: Severity::Error,
    }
  }
  pub fn warning(message: String) -> Self {
    Self {
      title: message,
      body: String::new(),
      hint: None,
      severity: Severity::Warning,
    }
  }
}
impl fmt::Display for Message {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.severity {
      Severity::Error => write!(f, "{}", "✕ Error".bold().red()),
      Severity::Warning => write!(f, "{}", "⚠ Warning".bold().yellow()),
    }?;
    writeln!(f, "{} {}", ":".bold(), &self.title.bold())?;

    if !self.body.is_empty() {
      writeln!(f, "{}", &self.body)?;
    }

    if let Some(hint) = &self.hint {
      writeln!(f, "{} {}", "hint:".italic().cyan(), hint)?;
    }

    Ok(())
  }
}
impl From<&ParseError> for Message {
  fn from(error: &ParseError) -> Self {
    let hint = match error {
      ParseError::UnsupportedSyntax { .. } => {
        Some("only the Handlebars syntax used by Glimmer templates can be formatted".into())
      }
      _ => None,
    };

    Self {
      title: error.title(),
      body: error.message(),
      hint,
      severity: Severity::Error,
    }
  }
}
impl From<&FormatError> for Message {
  fn from(error: &FormatError) -> Self {
    Self {
      title: error.title(),
      body: error.message(),
      hint: None,
      severity: Severity::Error,
    }
  }
}

pub struct CodeFrame<'a> {
  title: &'a str,
  source: &'a str,
  span: Span,

  lines: LineIndex,
}
impl<'a> CodeFrame<'a> {
  pub fn new(title: &'a str, source: &'a str, span: Span) -> Self {
    Self {
      title: if title == "-" { "STDIN" } else { title },
      source,
      span,
      lines: LineIndex::from_source(source),
    }
  }
}
impl fmt::Display for CodeFrame<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let start_line = self.lines.line(self.span).max(1);
    let end_line = self.lines.final_line(self.span).max(start_line);

    writeln!(
      f,
      "    {}{}{}{}{}",
      "╭─[".dimmed(),
      self.title,
      ":".dimmed(),
      start_line,
      "]".dimmed()
    )?;

    for line in start_line..=end_line {
      let line_text = self.lines.line_span(line).source_text(self.source);
      write!(f, "{line:>3} {}", "│".dimmed())?;
      if !line_text.is_empty() {
        write!(f, " ")?;
      }
      highlight_source(f, line_text)?;
      if !line_text.ends_with('\n') {
        writeln!(f)?;
      }
    }

    write!(f, "{}", "────╯".dimmed())
  }
}

/// Write a line of a template, with the insides of its mustaches highlighted
pub fn highlight_source(output: &mut dyn fmt::Write, source: &str) -> fmt::Result {
  let mut last = 0;

  while let Some(offset) = source[last..].find("{{") {
    let open = last + offset;
    write!(output, "{}", &source[last..open])?;

    if source[open + 2..].starts_with('!') || source[open + 2..].starts_with("~!") {
      let end = source[open..].find("}}").map_or(source.len(), |end| open + end + 2);
      write!(output, "{}", (&source[open..end]).dimmed())?;
      last = end;
      continue;
    }

    write!(output, "{}", "{{".cyan())?;
    last = open + 2;

    for token in tokenise(source, last) {
      let start = token.start as usize;
      let end = token.end() as usize;

      // the whitespace between tokens
      write!(output, "{}", &source[last..start])?;

      let style = match token.kind {
        TokenKind::Number
        | TokenKind::True
        | TokenKind::False
        | TokenKind::Null
        | TokenKind::Undefined => Style::new().blue(),
        TokenKind::String | TokenKind::UnterminatedString => Style::new().green(),
        TokenKind::Close | TokenKind::Tilde => Style::new().cyan(),
        TokenKind::Path | TokenKind::UnterminatedSegment => Style::new().magenta(),
        _ => Style::new(),
      };
      write!(output, "{}", (&source[start..end]).style(style))?;

      last = end;
    }
  }

  write!(output, "{}", &source[last..])
}
