//! # UI Tests for Debug Print Commands
#![cfg(not(miri))]

use assert_cmd::Command;
use indoc::indoc;

fn print_ast(file: &str) -> std::process::Output {
  Command::cargo_bin(env!("CARGO_PKG_NAME"))
    .unwrap()
    .args(["print", "ast", "-"])
    .write_stdin(file)
    .output()
    .unwrap()
}

#[test]
fn ast() {
  let output = print_ast("<p>{{name}}</p>");

  assert!(output.status.success());
  assert!(output.stderr.is_empty());

  let expected = indoc! {"
    ╭─[Abstract Syntax Tree: STDIN]
    Template
    ╰─ Element <p>
       ╰─ Children
          ╰─ Mustache
             ╰─ Path (name)
    ╯
  "};
  assert_eq!(String::from_utf8(output.stdout).unwrap(), expected);
}

#[test]
fn ast_is_normalized() {
  let output = print_ast("{{> header}}");

  assert!(output.status.success());
  let output = String::from_utf8(output.stdout).unwrap();
  assert!(output.contains("Verbatim \"{{> header}}\""));
}

#[test]
fn ast_with_errors() {
  let output = print_ast("<div>");

  assert!(output.status.success());
  let stderr = String::from_utf8(output.stderr).unwrap();
  assert!(stderr.starts_with("✕ Error: Unclosed Element"));

  let stdout = String::from_utf8(output.stdout).unwrap();
  assert!(stdout.starts_with("\n╭─[Abstract Syntax Tree: STDIN]\nTemplate\n"));
}
