//! Pattern-driven substitution of asset references with their revved paths.

use anyhow::{Context, Result};

use super::reference::ReferenceParts;
use crate::finder::Finder;
use crate::patterns::Pattern;

/// Apply every pattern to `content` in order, each over the previous pattern's output.
///
/// `log` receives each pattern's description before it runs, and a
/// `"<match> changed to <rewritten match>"` line for every reference that changed.
pub fn rewrite(
  content: &str,
  patterns: &[Pattern],
  search_path: &[String],
  finder: &dyn Finder,
  log: &dyn Fn(&str),
) -> Result<String> {
  let mut text = content.to_string();

  for pattern in patterns {
    log(pattern.description());
    text = rewrite_with_pattern(&text, pattern, search_path, finder, log)?;
  }

  Ok(text)
}

fn rewrite_with_pattern(
  content: &str,
  pattern: &Pattern,
  search_path: &[String],
  finder: &dyn Finder,
  log: &dyn Fn(&str),
) -> Result<String> {
  let mut output = String::with_capacity(content.len());
  let mut last = 0;

  for caps in pattern.matcher().captures_iter(content) {
    let (Some(whole), Some(reference)) = (caps.get(0), caps.get(1)) else {
      continue;
    };

    let rewritten = resolve_reference(reference.as_str(), pattern, search_path, finder)?;

    let matched = whole.as_str();
    let offset = reference.start() - whole.start();
    let replaced = format!(
      "{}{}{}",
      &matched[..offset],
      rewritten,
      &matched[offset + reference.len()..]
    );

    if reference.as_str() != rewritten {
      log(&format!("{matched} changed to {replaced}"));
    }

    output.push_str(&content[last..whole.start()]);
    output.push_str(&replaced);
    last = whole.end();
  }

  output.push_str(&content[last..]);
  Ok(output)
}

/// Resolve one captured reference, keeping its original query string and fragment.
pub fn resolve_reference(
  reference: &str,
  pattern: &Pattern,
  search_path: &[String],
  finder: &dyn Finder,
) -> Result<String> {
  let normalised = pattern.filter_in(reference);
  let parts = ReferenceParts::parse(&normalised);

  tracing::debug!(
    reference,
    path = parts.path,
    ?search_path,
    "looking for revved version"
  );
  let resolved = finder
    .find(parts.path, search_path)
    .with_context(|| format!("failed to resolve asset reference {reference}"))?;
  tracing::debug!(%resolved, "found file");

  let filtered = pattern.filter_out(&resolved);
  let resolved_path = ReferenceParts::parse(&filtered).path;
  Ok(parts.with_path(resolved_path))
}
