//! Extraction of `<!-- build:... -->` concatenation blocks from markup.

use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;

use crate::error::BlockError;
use crate::models::Block;

struct Directives {
  build: Regex,
  end: Regex,
  conditional_start: Regex,
  conditional_end: Regex,
  asset: Regex,
  media: Regex,
}

fn directives() -> &'static Directives {
  static DIRECTIVES: OnceLock<Directives> = OnceLock::new();
  DIRECTIVES.get_or_init(|| Directives {
    build: Regex::new(r"<!--\s*build:(\w+)(?:\(([^)]+)\))?\s*(\S+)?\s*.*?-->")
      .expect("invalid build directive regex"),
    end: Regex::new(r"<!--\s*endbuild\s*-->").expect("invalid endbuild regex"),
    conditional_start: Regex::new(r"<!--\[if.*\]>(?:<!-->)?(?: -->)?")
      .expect("invalid conditional start regex"),
    conditional_end: Regex::new(r"(?:<!--\s?)?<!\[endif\]-->")
      .expect("invalid conditional end regex"),
    asset: Regex::new(r#"(?:href|src)=["']([^'"]+)["']"#).expect("invalid asset regex"),
    media: Regex::new(r#"media=['"]([^'"]+)['"]"#).expect("invalid media regex"),
  })
}

struct PendingBlock {
  block: Block,
  defer: Option<bool>,
}

/// Collect the concatenation blocks of `content`, in document order.
///
/// Blocks that are never closed by `<!-- endbuild -->` are dropped.
pub fn extract_blocks(content: &str) -> Result<Vec<Block>> {
  let directives = directives();
  let mut blocks = Vec::new();
  let mut pending: Option<PendingBlock> = None;

  for line in content.split('\n') {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if let Some(caps) = directives.build.captures(line) {
      let kind = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
      let dest = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
      let mut block = Block::new(kind, dest, Vec::new());
      block.indent = line
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect();
      if let Some(alternate) = caps.get(2) {
        block.search_path.push(alternate.as_str().to_string());
      }
      pending = Some(PendingBlock { block, defer: None });
    }

    let Some(current) = pending.as_mut() else {
      continue;
    };

    if let Some(start) = directives.conditional_start.find(line) {
      current.block.conditional_start = Some(start.as_str().to_string());
    } else if let Some(end) = directives.conditional_end.find(line) {
      current.block.conditional_end = Some(end.as_str().to_string());
    }

    if directives.end.is_match(line) {
      current.block.raw.push(line.to_string());
      if let Some(finished) = pending.take() {
        blocks.push(finished.block);
      }
      continue;
    }

    if let Some(asset) = directives.asset.captures(line).and_then(|caps| caps.get(1)) {
      current.block.sources.push(asset.as_str().to_string());

      if current.block.media.is_none() {
        current.block.media = directives
          .media
          .captures(line)
          .and_then(|caps| caps.get(1))
          .map(|m| m.as_str().to_string());
      }

      let deferred = line.contains(" defer");
      match current.defer {
        Some(previous) if previous != deferred => {
          return Err(BlockError::MixedDefer {
            dest: current.block.dest.clone(),
          }
          .into());
        }
        _ => {
          current.defer = Some(deferred);
          current.block.defer = deferred;
        }
      }
    }

    current.block.raw.push(line.to_string());
  }

  Ok(blocks)
}
