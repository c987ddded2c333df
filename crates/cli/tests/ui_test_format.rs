//! # UI Tests for the Format Command
#![cfg(not(miri))]

use assert_cmd::Command;
use indoc::indoc;

fn format(args: &[&str], file: &str) -> std::process::Output {
  Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .arg("format")
    .args(args)
    .write_stdin(file)
    .output()
    .unwrap()
}

fn format_stdout(args: &[&str], file: &str) -> String {
  let output = format(args, file);

  assert!(output.status.success());
  assert!(output.stderr.is_empty());
  String::from_utf8(output.stdout).unwrap()
}

#[test]
fn formats_stdin() {
  let file = "<div   class='a'>{{  name  }}</div>";
  assert_eq!(format_stdout(&["-"], file), "<div class=\"a\">{{name}}</div>\n");
  assert_eq!(
    format_stdout(&["-", "--dryrun"], file),
    "<div class=\"a\">{{name}}</div>\n"
  );
}

#[test]
fn fmt_alias() {
  let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["fmt", "-"])
    .write_stdin("{{ a }}")
    .output()
    .unwrap();

  assert!(output.status.success());
  assert_eq!(String::from_utf8(output.stdout).unwrap(), "{{a}}\n");
}

#[test]
fn check_formatted() {
  let output = format(&["-", "--check"], "<p>{{name}}</p>\n");

  assert!(output.status.success());
  assert!(output.stdout.is_empty());
  assert!(output.stderr.is_empty());
}

#[test]
fn check_unformatted() {
  let output = format(&["-", "--check"], "<p>{{  name  }}</p>\n");

  assert_eq!(output.status.code(), Some(1));
  assert!(output.stdout.is_empty());

  let expected = indoc! {"
    ✕ Error: File is not formatted
    `STDIN` is not formatted
    hint: run `curly format` on the file to format it

  "};
  assert_eq!(String::from_utf8(output.stderr).unwrap(), expected);
}

#[test]
fn config_print_width() {
  let file = "{{some-helper firstArgument second=value}}";
  let expected = indoc! {"
    {{some-helper
      firstArgument
      second=value
    }}
  "};

  assert_eq!(format_stdout(&["-", "--config-print-width", "20"], file), expected);
  assert_eq!(format_stdout(&["-"], file), format!("{file}\n"));
}

#[test]
fn config_indent_size() {
  let file = "<div>\n<p>a</p>\n</div>";

  assert_eq!(
    format_stdout(&["-", "--config-indent-size", "4"], file),
    "<div>\n    <p>a</p>\n</div>\n"
  );
  assert_eq!(
    format_stdout(&["-", "--config-indent-size", "0"], file),
    "<div>\n\t<p>a</p>\n</div>\n"
  );
}

#[test]
fn config_single_quote() {
  let file = "<div title=\"x\">{{t \"y\"}}</div>";

  assert_eq!(
    format_stdout(&["-", "--config-single-quote"], file),
    "<div title='x'>{{t \"y\"}}</div>\n"
  );
}

#[test]
fn config_whitespace_sensitivity() {
  let file = "{{#if a}}yes{{else}}no{{/if}}";
  let expected = indoc! {"
    {{#if a}}
      yes
    {{else}}
      no
    {{/if}}
  "};

  assert_eq!(
    format_stdout(&["-", "--config-whitespace-sensitivity", "ignore"], file),
    expected
  );
  assert_eq!(
    format_stdout(&["-", "--config-whitespace-sensitivity", "css"], file),
    format!("{file}\n")
  );

  let output = format(&["-", "--config-whitespace-sensitivity", "html"], file);
  assert_eq!(output.status.code(), Some(2));
  assert!(output.stdout.is_empty());
}

#[test]
fn missing_file() {
  let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["format", "does-not-exist.hbs"])
    .output()
    .unwrap();

  assert_eq!(output.status.code(), Some(2));
  assert_eq!(
    String::from_utf8(output.stderr).unwrap(),
    "✕ Error: File not found `does-not-exist.hbs`\n\n"
  );
}
