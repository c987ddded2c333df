use crate::config::Quote;
use std::borrow::Cow;

/// The most line breaks in a row which are kept, so at most two blank lines
pub const MAX_PRESERVED_NEWLINES: usize = 3;

/// ASCII whitespace, as defined by the HTML standard
pub fn is_html_whitespace(c: char) -> bool {
  matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

/// The number of line breaks in a run of whitespace, capped at the most that are kept
pub fn count_newlines(whitespace: &str) -> usize {
  whitespace.matches('\n').count().min(MAX_PRESERVED_NEWLINES)
}

/// Choose the quote which needs the least escaping, ties go to the preferred quote
pub fn preferred_quote<'s>(text: impl IntoIterator<Item = &'s str>, preferred: Quote) -> Quote {
  let (double, single) = text.into_iter().fold((0, 0), |(double, single), text| {
    (
      double + text.matches('"').count(),
      single + text.matches('\'').count(),
    )
  });

  let (preferred_count, other_count) = match preferred {
    Quote::Double => (double, single),
    Quote::Single => (single, double),
  };

  if preferred_count > other_count { preferred.opposite() } else { preferred }
}

/// Escape the start of a mustache, so it is kept as text
pub fn escape_mustache(text: &str) -> Cow<'_, str> {
  if text.contains("{{") {
    Cow::Owned(text.replace("{{", "\\{{"))
  } else {
    Cow::Borrowed(text)
  }
}

/// Escape text inside a quoted attribute value
pub fn escape_attribute_text(text: &str, quote: Quote) -> Cow<'_, str> {
  if text.contains(quote.as_char()) {
    Cow::Owned(escape_mustache(&text.replace(quote.as_char(), quote.entity())).into_owned())
  } else {
    escape_mustache(text)
  }
}

/// Escape the quote inside a string literal
pub fn escape_string(text: &str, quote: Quote) -> Cow<'_, str> {
  if text.contains(quote.as_char()) {
    Cow::Owned(text.replace(quote.as_char(), &format!("\\{}", quote.as_char())))
  } else {
    Cow::Borrowed(text)
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn quote_with_least_escaping() {
    assert_eq!(preferred_quote(["plain"], Quote::Double), Quote::Double);
    assert_eq!(preferred_quote(["plain"], Quote::Single), Quote::Single);
    assert_eq!(preferred_quote(["say \"hi\""], Quote::Double), Quote::Single);
    assert_eq!(preferred_quote(["it's"], Quote::Single), Quote::Double);
    assert_eq!(preferred_quote(["\"a\"", "'b'"], Quote::Single), Quote::Single);
    assert_eq!(preferred_quote(["\"", "'", "'"], Quote::Single), Quote::Double);
  }

  #[test]
  fn newlines_are_capped() {
    assert_eq!(count_newlines("  "), 0);
    assert_eq!(count_newlines("\n  "), 1);
    assert_eq!(count_newlines("\r\n\r\n"), 2);
    assert_eq!(count_newlines("\n\n\n"), 3);
    assert_eq!(count_newlines("\n\n\n\n\n"), 3);
  }

  #[test]
  fn escapes() {
    assert_eq!(escape_mustache("a {{b}}"), "a \\{{b}}");
    assert_eq!(escape_attribute_text("a \"b\" {{c", Quote::Double), "a &quot;b&quot; \\{{c");
    assert_eq!(escape_attribute_text("it's", Quote::Single), "it&apos;s");
    assert_eq!(escape_string("it's", Quote::Single), "it\\'s");
    assert_eq!(escape_string("it's", Quote::Double), "it's");
  }
}
