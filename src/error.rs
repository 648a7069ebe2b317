//! Error types surfaced while configuring and running the rewriter.

/// Errors raised while assembling a [`crate::Processor`].
#[derive(Debug)]
pub enum ConfigError {
  /// No pattern selector was supplied.
  MissingPatterns,
  /// The selector names a preset that does not exist.
  UnsupportedPreset(String),
  /// No finder collaborator was supplied.
  MissingFinder,
  /// A caller-supplied matcher failed to compile.
  InvalidPattern {
    /// Source text of the rejected matcher.
    pattern: String,
    /// Underlying regex error.
    source: regex::Error,
  },
}

impl std::fmt::Display for ConfigError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::MissingPatterns => write!(f, "no pattern given"),
      Self::UnsupportedPreset(name) => write!(f, "unsupported preset: {name}"),
      Self::MissingFinder => write!(f, "missing parameter: finder"),
      Self::InvalidPattern { pattern, source } => {
        write!(f, "invalid pattern {pattern}: {source}")
      }
    }
  }
}

impl std::error::Error for ConfigError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::InvalidPattern { source, .. } => Some(source),
      _ => None,
    }
  }
}

/// Errors raised while locating or replacing concatenation blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
  /// Strict mode only: the block's raw text is not present in the document.
  NotFound {
    /// Destination of the block that could not be located.
    dest: String,
  },
  /// A block mixes deferred and non-deferred scripts.
  MixedDefer {
    /// Destination of the offending block.
    dest: String,
  },
}

impl std::fmt::Display for BlockError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::NotFound { dest } => {
        write!(f, "block for {dest} was not found in the document")
      }
      Self::MixedDefer { dest } => write!(
        f,
        "block for {dest} mixes deferred and non-deferred scripts"
      ),
    }
  }
}

impl std::error::Error for BlockError {}
