use super::config::{Config, LineEnding, WhitespaceSensitivity};
use super::error::FormatError;
use super::formatter::{Formatter, IR};
use bumpalo::{Bump as Allocator, collections::Vec};
use curly_syntax::{parse, parse_unnormalized};

fn config(print_width: u16) -> Config {
  Config {
    print_width,
    line_ending: LineEnding::LineFeed,
    ..Config::default()
  }
}

#[test]
fn group_fits_or_breaks() {
  let allocator = Allocator::new();
  let wide = Formatter::new(config(80), "", &allocator);
  let narrow = Formatter::new(config(5), "", &allocator);

  let ir = wide.group([
    IR::Text("{{"),
    wide.indent([IR::Text("a"), IR::LineOrSpace, IR::Text("b")]),
    IR::Line,
    IR::Text("}}"),
  ]);

  assert_eq!(wide.render(&ir), "{{a b}}\n");
  assert_eq!(narrow.render(&ir), "{{a\n  b\n}}\n");
}

#[test]
fn forced_line_breaks_group() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(80), "", &allocator);

  let ir = f.group([
    IR::Text("a"),
    IR::LineOrSpace,
    IR::Text("b"),
    IR::AlwaysLine,
    IR::Text("c"),
  ]);
  assert_eq!(f.render(&ir), "a\nb\nc\n");
}

#[test]
fn if_break() {
  let allocator = Allocator::new();
  let wide = Formatter::new(config(80), "", &allocator);
  let narrow = Formatter::new(config(3), "", &allocator);

  let ir = wide.group([
    IR::Text("<div"),
    wide.if_break(wide.concat([IR::Line, IR::Text(">")]), IR::Text(">")),
  ]);

  assert_eq!(wide.render(&ir), "<div>\n");
  assert_eq!(narrow.render(&ir), "<div\n>\n");
}

#[test]
fn fill_breaks_only_where_needed() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(8), "", &allocator);

  let words = ["aaa", "bbb", "ccc", "ddd"];
  let mut parts = Vec::new_in(&allocator);
  for (index, word) in words.into_iter().enumerate() {
    if index > 0 {
      parts.push(IR::LineOrSpace);
    }
    parts.push(IR::Text(word));
  }

  assert_eq!(f.render(&IR::Fill(parts)), "aaa bbb\nccc ddd\n");
}

#[test]
fn dedent() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(80), "", &allocator);

  let ir = f.concat([
    IR::Text("a"),
    f.indent([IR::AlwaysLine, IR::Text("b"), f.dedent(IR::AlwaysLine)]),
    IR::Text("c"),
  ]);
  assert_eq!(f.render(&ir), "a\n  b\nc\n");
}

#[test]
fn literal_lines_keep_their_content() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(80), "", &allocator);

  let ir = f.indent([IR::Text("a"), IR::AlwaysLine, f.literal_text("b  \n  c")]);
  assert_eq!(f.render(&ir), "a\n  b  \n  c\n");
}

#[test]
fn trailing_whitespace_is_removed() {
  let allocator = Allocator::new();
  let f = Formatter::new(config(80), "", &allocator);

  let ir = f.indent([
    IR::Text("a "),
    IR::AlwaysLine,
    IR::AlwaysLine,
    IR::Text("b"),
  ]);
  assert_eq!(f.render(&ir), "a\n\n  b\n");

  assert_eq!(f.render(&IR::Empty), "");
}

#[test]
fn config_indentation() {
  let ast = parse("<div>\n<p>a</p>\n</div>".to_owned());
  let mut config = config(80);

  assert_eq!(
    crate::format(&ast, config),
    Ok("<div>\n  <p>a</p>\n</div>\n".to_owned())
  );
  config.indentation = 4.into();
  assert_eq!(
    crate::format(&ast, config),
    Ok("<div>\n    <p>a</p>\n</div>\n".to_owned())
  );
  config.indentation = 0.into();
  assert_eq!(
    crate::format(&ast, config),
    Ok("<div>\n\t<p>a</p>\n</div>\n".to_owned())
  );
}

#[test]
fn config_line_ending() {
  let ast = parse("{{a}}\n\n{{b}}".to_owned());
  let config = Config {
    line_ending: LineEnding::CarriageReturnLineFeed,
    ..Config::default()
  };

  assert_eq!(
    crate::format(&ast, config),
    Ok("{{a}}\r\n\r\n{{b}}\r\n".to_owned())
  );
}

#[test]
fn config_from_strings() {
  assert_eq!("css".parse(), Ok(WhitespaceSensitivity::Strict));
  assert_eq!("ignore".parse(), Ok(WhitespaceSensitivity::Ignore));
  assert!("html".parse::<WhitespaceSensitivity>().is_err());

  assert_eq!(WhitespaceSensitivity::Ignore.to_string(), "ignore");
  assert_eq!(super::Quote::Single.to_string(), "single");
  assert_eq!("double".parse(), Ok(super::Quote::Double));
}

#[test]
fn empty_template() {
  let ast = parse(String::new());
  assert_eq!(crate::format(&ast, config(80)), Ok(String::new()));

  let ast = parse("  \n\n ".to_owned());
  assert_eq!(crate::format(&ast, config(80)), Ok(String::new()));
}

#[test]
fn print_document() {
  let ast = parse("{{a}}".to_owned());
  let document = crate::print_document(&ast, config(80)).unwrap();

  assert!(document.starts_with("Group("));
  assert!(document.contains("Text '{{'"));
  assert!(document.contains("Text 'a'"));
}

#[test]
fn unnormalized_nodes_are_unsupported() {
  let ast = parse_unnormalized("<p>{{> header}}</p>".to_owned());
  let error = crate::format(&ast, config(80)).unwrap_err();

  assert!(matches!(
    error,
    FormatError::UnsupportedNode {
      kind: "PartialStatement",
      ..
    }
  ));
  assert_eq!(error.span().start, 3);
  assert_eq!(error.title(), "Unsupported Node");
}
