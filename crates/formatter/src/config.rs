//! The configuration options for the formatter
use std::{fmt, str::FromStr};

/// Configuration for the formatter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
  /// The max print width to aim for
  pub print_width: u16,
  /// How whitespace in text content is treated
  pub whitespace_sensitivity: WhitespaceSensitivity,
  /// The quote to use for attribute values when either would need no escaping
  pub preferred_quote: Quote,
  /// The number of spaces to use for indentation, if 0 use tabs
  pub indentation: Indentation,
  /// The line ending to use
  pub line_ending: LineEnding,
}
impl Default for Config {
  fn default() -> Self {
    Self {
      print_width: 80,
      whitespace_sensitivity: WhitespaceSensitivity::Strict,
      preferred_quote: Quote::Double,
      indentation: Indentation::Space(2),
      line_ending: LineEnding::Native,
    }
  }
}

/// How significant whitespace in text content is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WhitespaceSensitivity {
  /// Whitespace is significant, authored line breaks are kept (`css`)
  #[default]
  Strict,
  /// Whitespace is not significant, and is freely changed (`ignore`)
  Ignore,
}
impl FromStr for WhitespaceSensitivity {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "css" | "strict" => Ok(Self::Strict),
      "ignore" => Ok(Self::Ignore),
      _ => Err(format!("unknown whitespace sensitivity `{s}`, expected `css` or `ignore`")),
    }
  }
}
impl fmt::Display for WhitespaceSensitivity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Strict => write!(f, "css"),
      Self::Ignore => write!(f, "ignore"),
    }
  }
}

/// A quote character for attribute values and strings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Quote {
  /// `"`
  #[default]
  Double,
  /// `'`
  Single,
}
impl Quote {
  /// The quote as a character
  #[must_use]
  pub const fn as_char(self) -> char {
    match self {
      Self::Double => '"',
      Self::Single => '\'',
    }
  }

  /// The quote as a string
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Double => "\"",
      Self::Single => "'",
    }
  }

  /// The other quote
  #[must_use]
  pub const fn opposite(self) -> Self {
    match self {
      Self::Double => Self::Single,
      Self::Single => Self::Double,
    }
  }

  /// The HTML character reference for the quote
  pub(crate) const fn entity(self) -> &'static str {
    match self {
      Self::Double => "&quot;",
      Self::Single => "&apos;",
    }
  }
}
impl FromStr for Quote {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "double" | "\"" => Ok(Self::Double),
      "single" | "'" => Ok(Self::Single),
      _ => Err(format!("unknown quote `{s}`, expected `double` or `single`")),
    }
  }
}
impl fmt::Display for Quote {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Double => write!(f, "double"),
      Self::Single => write!(f, "single"),
    }
  }
}

/// The indentation to use when printing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indentation {
  /// Use this number of spaces for indentation
  Space(u16),
  /// Use tabs for indentation
  Tab,
}
impl Indentation {
  pub(super) fn len(self) -> usize {
    match self {
      Self::Space(n) => usize::from(n),
      Self::Tab => 2,
    }
  }

  /// Add a given depth of indentation to a string
  pub(super) fn push_to(self, output: &mut String, depth: u16) {
    let depth = usize::from(depth);
    match self {
      Self::Space(n) => output.extend(std::iter::repeat_n(' ', usize::from(n) * depth)),
      Self::Tab => output.extend(std::iter::repeat_n('\t', depth)),
    }
  }
}
impl From<u16> for Indentation {
  /// The number of spaces to use for indentation. If 0 use tabs.
  fn from(n: u16) -> Self {
    if n == 0 { Self::Tab } else { Self::Space(n) }
  }
}

/// The type of line endings to use for the file
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum LineEnding {
  ///  Line Feed only (\n), common on Linux and macOS as well as inside git repos
  LineFeed,

  /// Carriage Return + Line Feed characters (\r\n), common on Windows
  CarriageReturnLineFeed,

  /// Line endings will be converted to `\n` on Unix and `\r\n` on Windows.
  #[default]
  Native,
}
impl LineEnding {
  #[inline]
  pub(super) const fn as_str(self) -> &'static str {
    match self {
      LineEnding::LineFeed => "\n",
      LineEnding::CarriageReturnLineFeed => "\r\n",

      #[cfg(not(target_os = "windows"))]
      LineEnding::Native => "\n",
      #[cfg(target_os = "windows")]
      LineEnding::Native => "\r\n",
    }
  }
}
