use super::FormatOptions;
use super::diagnostics::{CodeFrame, Message, Severity};

use curly_formatter::FormatterConfig;
use curly_syntax::AST;

use anstream::{eprintln, print, println};
use std::fs;

pub enum CommandStatus {
  /// Command was successful, no errors or warnings occurred
  Success,
  /// Command was successful, but the file wasn't as expected
  Failure,
}

fn display_name(filename: &str) -> &str {
  if filename == "-" { "STDIN" } else { filename }
}

fn read_file(filename: &str) -> Result<String, ()> {
  if filename == "-" {
    return read_stdin();
  }

  match fs::read_to_string(filename) {
    Ok(file) if file.is_empty() => {
      eprintln!("{}", Message::warning(format!("Empty file `{filename}`")));
      Err(())
    }
    Ok(file) if file.len() >= u32::MAX as usize => {
      eprintln!("{}", Message::error("File too large - max size 4GB".into()));
      Err(())
    }
    Ok(file) => Ok(file),
    Err(_) => {
      eprintln!("{}", Message::error(format!("File not found `{filename}`")));
      Err(())
    }
  }
}

fn read_stdin() -> Result<String, ()> {
  use std::io::{self, Read};

  let mut buffer = Vec::new();
  let mut stdin = io::stdin().lock();

  match stdin.read_to_end(&mut buffer) {
    Ok(_) if buffer.len() >= u32::MAX as usize => {
      eprintln!("{}", Message::error("File too large - max size 4GB".into()));
      Err(())
    }
    Ok(_) => String::from_utf8(buffer).map_err(|_| {
      eprintln!("{}", Message::error("STDIN is not valid UTF-8".into()));
    }),
    Err(_) => {
      eprintln!("{}", Message::error("Problem Reading from STDIN".into()));
      Err(())
    }
  }
}

fn parse(filename: &str, source: String) -> Result<AST, ()> {
  let ast = curly_syntax::parse(source);

  if ast.is_valid() {
    Ok(ast)
  } else {
    for error in &ast.errors {
      eprintln!("{}", Message::from(error));
      eprintln!("{}", CodeFrame::new(filename, &ast.source, error.span()));
    }
    Err(())
  }
}

pub fn format(options: &FormatOptions) -> Result<CommandStatus, ()> {
  let config = FormatterConfig {
    print_width: options.config_print_width,
    whitespace_sensitivity: options.config_whitespace_sensitivity,
    preferred_quote: options.preferred_quote(),
    indentation: options.config_indent_size.into(),
    ..FormatterConfig::default()
  };

  let source = read_file(&options.file)?;
  let ast = parse(&options.file, source)?;
  log::debug!("formatting `{}` with {config:?}", display_name(&options.file));

  let formatted_source = match curly_formatter::format(&ast, config) {
    Ok(formatted_source) => formatted_source,
    Err(error) => {
      eprintln!("{}", Message::from(&error));
      eprintln!("{}", CodeFrame::new(&options.file, &ast.source, error.span()));
      return Err(());
    }
  };

  if options.dryrun {
    print!("{formatted_source}");
    return Ok(CommandStatus::Success);
  }

  if options.check {
    if formatted_source == ast.source {
      return Ok(CommandStatus::Success);
    }

    eprintln!("{}", Message {
      title: "File is not formatted".into(),
      body: format!("`{}` is not formatted", display_name(&options.file)),
      hint: Some("run `curly format` on the file to format it".into()),
      severity: Severity::Error,
    });
    return Ok(CommandStatus::Failure);
  }

  if options.file == "-" {
    print!("{formatted_source}");
    return Ok(CommandStatus::Success);
  }

  if formatted_source != ast.source && fs::write(&options.file, formatted_source).is_err() {
    eprintln!("{}", Message::error("Problem writing to file".into()));
    return Err(());
  }

  Ok(CommandStatus::Success)
}

pub fn print_ast(filename: &str) -> Result<CommandStatus, ()> {
  let source = read_file(filename)?;
  let ast = curly_syntax::parse(source);

  if !ast.is_valid() {
    for error in &ast.errors {
      eprintln!("{}", Message::from(error));
      eprintln!("{}", CodeFrame::new(filename, &ast.source, error.span()));
    }
    println!();
  }

  println!("╭─[Abstract Syntax Tree: {}]", display_name(filename));
  print!("{ast}");
  println!("╯");

  Ok(CommandStatus::Success)
}
