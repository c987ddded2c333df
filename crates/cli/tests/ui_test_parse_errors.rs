//! # UI Tests for Parse Errors
#![cfg(not(miri))]

use assert_cmd::Command;
use indoc::indoc;

fn format_stderr(file: &str) -> String {
  let output = Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["format", "-"])
    .write_stdin(file)
    .output()
    .unwrap();

  assert_eq!(output.status.code(), Some(2));
  assert!(output.stdout.is_empty());
  String::from_utf8(output.stderr).unwrap()
}

#[test]
fn unclosed_element() {
  let output = format_stderr("<div>\n");
  let expected = indoc! {"
    ✕ Error: Unclosed Element
    element `<div>` is never closed

        ╭─[STDIN:1]
      1 │ <div>
    ────╯
  "};
  assert_eq!(output, expected);
}

#[test]
fn mismatched_block_close() {
  let output = format_stderr("{{#if a}}\n{{/each}}\n");
  let expected = indoc! {"
    ✕ Error: Mismatched Block Close
    expected `{{/if}}` but found `{{/each}}`

        ╭─[STDIN:2]
      2 │ {{/each}}
    ────╯
  "};
  assert_eq!(output, expected);
}

#[test]
fn unsupported_syntax() {
  let output = format_stderr("{{#*inline \"name\"}}x{{/inline}}");

  assert!(output.starts_with("✕ Error: Unsupported Syntax\n"));
  assert!(output.contains("hint: only the Handlebars syntax used by Glimmer templates"));
  assert!(output.contains("╭─[STDIN:1]"));
}
