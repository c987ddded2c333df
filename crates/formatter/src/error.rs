use curly_syntax::Span;
use std::{error, fmt};

/// An error which stops a template from being formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
  /// A node which can only exist before normalization, e.g. a partial
  UnsupportedNode {
    /// The name of the kind of node
    kind: &'static str,
    /// The location of the node
    span: Span,
  },
}
impl FormatError {
  /// The title of the error message
  #[must_use]
  pub fn title(&self) -> String {
    match self {
      Self::UnsupportedNode { .. } => "Unsupported Node".into(),
    }
  }

  /// The body of the error message describing what has gone wrong
  #[must_use]
  pub fn message(&self) -> String {
    match self {
      Self::UnsupportedNode { kind, .. } => {
        format!("`{kind}` can't be printed, the template must be normalized first")
      }
    }
  }

  /// The location of the error
  #[must_use]
  pub fn span(&self) -> Span {
    match self {
      Self::UnsupportedNode { span, .. } => *span,
    }
  }
}
impl fmt::Display for FormatError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message())
  }
}
impl error::Error for FormatError {}
