//! Lookup of fingerprinted asset paths.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

/// Maps a normalised asset path to its revved counterpart.
///
/// Implementations must be safe to call from several threads at once.
pub trait Finder: Send + Sync {
  /// Resolve `path`, consulting `search_path` directories in order.
  fn find(&self, path: &str, search_path: &[String]) -> Result<String>;
}

impl<F> Finder for F
where
  F: Fn(&str, &[String]) -> Result<String> + Send + Sync,
{
  fn find(&self, path: &str, search_path: &[String]) -> Result<String> {
    self(path, search_path)
  }
}

fn external_reference_patterns() -> &'static [Regex] {
  static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      vec![
        Regex::new(r"(?i)^https?://").expect("invalid http(s) regex"),
        Regex::new(r"^//").expect("invalid protocol-relative regex"),
        Regex::new(r"(?i)^data:").expect("invalid data URI regex"),
        Regex::new(r"(?i)^mailto:").expect("invalid mailto regex"),
      ]
    })
    .as_slice()
}

/// Whether `reference` points outside the built site and can never be revved.
pub fn is_external_reference(reference: &str) -> bool {
  external_reference_patterns()
    .iter()
    .any(|pattern| pattern.is_match(reference))
}

/// Finder backed by a revision summary mapping original paths to revved paths.
///
/// References the summary does not know about, and external references, are returned
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct SummaryFinder {
  entries: BTreeMap<String, String>,
}

impl SummaryFinder {
  /// Build a finder from `(original, revved)` pairs.
  pub fn new<I, K, V>(entries: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
  {
    Self {
      entries: entries
        .into_iter()
        .map(|(original, revved)| {
          (normalise_key(original.as_ref()), normalise_key(revved.as_ref()))
        })
        .collect(),
    }
  }

  /// Read a JSON summary of the form `{ "original": "revved" }`.
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read revision summary {}", path.display()))?;
    Self::from_json(&content)
      .with_context(|| format!("failed to parse revision summary {}", path.display()))
  }

  /// Parse a JSON summary from memory.
  pub fn from_json(content: &str) -> Result<Self> {
    let entries: BTreeMap<String, String> = serde_json::from_str(content)?;
    Ok(Self::new(entries))
  }

  /// Number of known assets.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether the summary is empty.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl Finder for SummaryFinder {
  fn find(&self, path: &str, search_path: &[String]) -> Result<String> {
    if path.is_empty() || is_external_reference(path) {
      return Ok(path.to_string());
    }

    let rooted = path.starts_with('/');
    let bases = search_path
      .iter()
      .map(String::as_str)
      .chain(std::iter::once(""));

    for base in bases {
      let (Some(base_segments), Some(key_segments)) = (
        collapse_segments(base),
        collapse_segments(&format!("{base}/{path}")),
      ) else {
        continue;
      };
      let key = key_segments.join("/");

      if let Some(revved) = self.entries.get(&key) {
        let local = relative_to(&base_segments, revved);
        tracing::debug!(%key, %revved, "revision summary hit");
        return Ok(if rooted { format!("/{local}") } else { local });
      }
    }

    tracing::debug!(path, "no revved version found");
    Ok(path.to_string())
  }
}

/// Lexically resolve `.` and `..` segments. `None` when `..` climbs above the start.
fn collapse_segments(path: &str) -> Option<Vec<String>> {
  let mut segments = Vec::new();
  for segment in path.replace('\\', "/").split('/') {
    match segment {
      "" | "." => {}
      ".." => {
        segments.pop()?;
      }
      other => segments.push(other.to_string()),
    }
  }
  Some(segments)
}

fn normalise_key(value: &str) -> String {
  collapse_segments(value)
    .map(|segments| segments.join("/"))
    .unwrap_or_else(|| value.replace('\\', "/"))
}

/// Express `target` as a path relative to the `base` directory.
fn relative_to(base: &[String], target: &str) -> String {
  let target: Vec<&str> = target.split('/').collect();
  let common = base
    .iter()
    .zip(&target)
    .take_while(|(dir, segment)| dir.as_str() == **segment)
    .count();

  let mut parts = vec![".."; base.len() - common];
  parts.extend_from_slice(&target[common..]);
  parts.join("/")
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn finder() -> SummaryFinder {
    SummaryFinder::new([
      ("dist/scripts/app.js", "dist/scripts/app.3f2a.js"),
      ("dist\\styles\\main.css", "dist\\styles\\main.99ee.css"),
      ("images/logo.png", "images/logo.a1b2.png"),
    ])
  }

  #[test]
  fn resolves_relative_to_search_path() {
    let search = vec!["dist".to_string()];
    assert_eq!(
      finder().find("scripts/app.js", &search).unwrap(),
      "scripts/app.3f2a.js"
    );
    assert_eq!(
      finder().find("styles/main.css", &search).unwrap(),
      "styles/main.99ee.css"
    );
  }

  #[test]
  fn keeps_root_prefix() {
    let search = vec!["./dist/".to_string()];
    assert_eq!(
      finder().find("/scripts/app.js", &search).unwrap(),
      "/scripts/app.3f2a.js"
    );
  }

  #[test]
  fn falls_back_to_bare_reference() {
    assert_eq!(
      finder().find("images/logo.png", &["dist".to_string()]).unwrap(),
      "images/logo.a1b2.png"
    );
  }

  #[test]
  fn returns_misses_and_external_references_unchanged() {
    let finder = finder();
    assert_eq!(finder.find("missing.js", &[]).unwrap(), "missing.js");
    assert_eq!(
      finder.find("https://cdn.example.com/app.js", &[]).unwrap(),
      "https://cdn.example.com/app.js"
    );
    assert_eq!(finder.find("//cdn/app.js", &[]).unwrap(), "//cdn/app.js");
    assert_eq!(finder.find("", &[]).unwrap(), "");
  }

  #[test]
  fn revved_paths_resolve_to_themselves() {
    let search = vec!["dist".to_string()];
    assert_eq!(
      finder().find("scripts/app.3f2a.js", &search).unwrap(),
      "scripts/app.3f2a.js"
    );
  }

  #[test]
  fn resolves_parent_references_from_stylesheet_directory() {
    let finder = SummaryFinder::new([("dist/images/bg.png", "dist/images/bg.77.png")]);
    let search = vec!["dist/styles".to_string()];
    assert_eq!(
      finder.find("../images/bg.png", &search).unwrap(),
      "../images/bg.77.png"
    );
  }

  #[test]
  fn collapses_inner_dot_segments() {
    let finder = SummaryFinder::new([("./dist/fonts/../img/a.png", "dist/img/a.5.png")]);
    let search = vec!["dist/./css".to_string()];
    assert_eq!(
      finder.find("./../img/./a.png", &search).unwrap(),
      "../img/a.5.png"
    );
  }

  #[test]
  fn references_climbing_above_every_base_are_left_alone() {
    let finder = SummaryFinder::new([("images/bg.png", "images/bg.77.png")]);
    assert_eq!(
      finder.find("../../images/bg.png", &["dist".to_string()]).unwrap(),
      "../../images/bg.png"
    );
  }

  #[test]
  fn closures_act_as_finders() {
    let finder = |path: &str, _: &[String]| -> Result<String> { Ok(path.to_uppercase()) };
    assert_eq!(Finder::find(&finder, "a.js", &[]).unwrap(), "A.JS");
  }

  #[test]
  fn loads_summary_from_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rev.json");
    fs::write(&path, r#"{"app.js": "app.1234.js"}"#).unwrap();

    let finder = SummaryFinder::from_path(&path).unwrap();
    assert_eq!(finder.len(), 1);
    assert_eq!(finder.find("app.js", &[]).unwrap(), "app.1234.js");
  }

  #[test]
  fn reports_malformed_summaries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rev.json");
    fs::write(&path, "not json").unwrap();

    let err = SummaryFinder::from_path(&path).unwrap_err();
    assert!(err.to_string().contains("failed to parse revision summary"));
  }
}
