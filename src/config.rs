//! Project configuration for the rewriter, discovered next to the working directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// File name searched for by [`RewriteConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "rev-rewrite.config.json";

/// Discoverable configuration describing how documents should be rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
  /// Preset used to match references (`html` or `css`).
  pub preset: String,
  /// Directories overriding each document's own search path when non-empty.
  pub search_path: Vec<String>,
  /// Revision summary JSON mapping original paths to revved paths.
  pub summary: Option<PathBuf>,
  /// Fail when a concatenation block cannot be located.
  pub strict: bool,
}

impl Default for RewriteConfig {
  fn default() -> Self {
    Self {
      preset: "html".into(),
      search_path: Vec::new(),
      summary: None,
      strict: false,
    }
  }
}

impl RewriteConfig {
  /// Attempt to load configuration from the provided directory.
  ///
  /// Missing or unparsable files fall back to the defaults.
  pub fn discover(dir: &Path) -> Self {
    let candidate = dir.join(DEFAULT_CONFIG_FILE);
    Self::from_path(&candidate).unwrap_or_default()
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read configuration {}", path.display()))?;
    serde_json::from_str(&content)
      .with_context(|| format!("failed to parse configuration {}", path.display()))
  }
}
