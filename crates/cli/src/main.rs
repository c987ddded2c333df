//! # Curly
//! An opinionated formatter for Handlebars and Glimmer templates.
//!
//! Parses templates mixing HTML and `{{mustaches}}`, and prints them back out in
//! a single canonical style.

#![allow(clippy::print_stdout)]

mod commands;
mod diagnostics;

use clap::builder::styling::{AnsiColor, Style, Styles};
use clap::{Args, Parser, Subcommand};
use commands::CommandStatus;
use curly_formatter::{Quote, WhitespaceSensitivity};
use owo_colors::*;
use std::process;

const STYLES: Styles = Styles::styled()
  .usage(Style::new().italic())
  .header(AnsiColor::BrightYellow.on_default().bold());

fn coloured_header() -> String {
  format!(
    "{} {}",
    "Curly".fg::<owo_colors::colors::css::Orange>().bold(),
    "(v0.1.0)".italic().dimmed()
  )
}

fn about() -> String {
  format!(
    "{}\nA formatter for Handlebars and Glimmer templates.",
    coloured_header()
  )
}

#[derive(Parser)]
#[clap(
  name = "curly",
  version,
  about = about(),
  styles = STYLES,
  disable_help_subcommand = true,
)]
struct App {
  #[command(subcommand)]
  command: Command,

  /// Log what the parser and formatter are doing (also enabled by `RUST_LOG`)
  #[clap(long, short, global = true)]
  verbose: bool,
}

#[derive(Subcommand)]
enum Command {
  /// Formats template files
  #[clap(alias = "fmt")]
  Format(FormatOptions),

  /// Prints debugging information
  Print {
    #[command(subcommand)]
    command: PrintCommand,
  },
}

#[derive(Args)]
struct FormatOptions {
  /// The file to format, or `-` to read from STDIN
  file: String,
  /// Preview the results of the formatting
  #[clap(long)]
  dryrun: bool,
  /// Check the file is formatted. Do not write to file
  #[clap(long)]
  check: bool,

  /// Prefer single quotes for attribute values
  #[clap(long, help_heading = "Formatting Config")]
  config_single_quote: bool,
  /// Maximum line width
  #[clap(long, default_value_t = 80, help_heading = "Formatting Config")]
  config_print_width: u16,
  /// Indentation size (spaces) to use. If 0 uses tabs
  #[clap(long, default_value_t = 2, help_heading = "Formatting Config")]
  config_indent_size: u16,
  /// Whether whitespace between nodes is significant (`css`), or can be changed (`ignore`)
  #[clap(
    long,
    default_value_t = WhitespaceSensitivity::Strict,
    value_name = "css|ignore",
    help_heading = "Formatting Config"
  )]
  config_whitespace_sensitivity: WhitespaceSensitivity,
}
impl FormatOptions {
  fn preferred_quote(&self) -> Quote {
    if self.config_single_quote {
      Quote::Single
    } else {
      Quote::Double
    }
  }
}

#[derive(Subcommand)]
enum PrintCommand {
  /// Displays the Abstract Syntax Tree, after normalization
  Ast {
    /// The file to print, or `-` to read from STDIN
    file: String,
  },
}

fn setup_logging(verbose: bool) {
  let mut logger = env_logger::Builder::from_default_env();
  if verbose {
    logger.filter_level(log::LevelFilter::Debug);
  }
  logger.init();
}

fn main() -> process::ExitCode {
  let args = App::parse();
  setup_logging(args.verbose);

  let result = match args.command {
    Command::Format(options) => commands::format(&options),
    Command::Print { command } => match command {
      PrintCommand::Ast { file } => commands::print_ast(&file),
    },
  };

  match result {
    Ok(CommandStatus::Success) => process::ExitCode::from(0),
    Ok(CommandStatus::Failure) => process::ExitCode::from(1),
    Err(()) => process::ExitCode::from(2),
  }
}
