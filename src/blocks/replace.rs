//! Collapse concatenation blocks into the tag that references their bundle.

use anyhow::Result;

use super::render::{line_terminator, render_replacement};
use crate::error::BlockError;
use crate::models::Document;

/// Replaces every block of a document with its rendered tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockReplacer {
  strict: bool,
}

impl BlockReplacer {
  /// Create a replacer. In strict mode a block missing from the text is an error instead of
  /// a silent no-op.
  pub fn new(strict: bool) -> Self {
    Self { strict }
  }

  /// Replace the first occurrence of each block's raw text, in block order.
  ///
  /// Every block sees the text produced by the blocks before it, so a block whose raw lines
  /// were altered by an earlier substitution is no longer found.
  pub fn replace(&self, document: &Document) -> Result<String> {
    let mut result = document.content.clone();
    let linefeed = line_terminator(&result);

    for block in &document.blocks {
      let search = block.raw.join(linefeed);
      if search.is_empty() || !result.contains(&search) {
        if self.strict {
          return Err(BlockError::NotFound {
            dest: block.dest.clone(),
          }
          .into());
        }
        tracing::warn!(dest = %block.dest, "block not found in document, skipping");
        continue;
      }

      let Some(replacement) = render_replacement(block, linefeed) else {
        tracing::warn!(
          dest = %block.dest,
          kind = ?block.kind,
          "block renders no tag, leaving it untouched"
        );
        continue;
      };

      result = result.replacen(&search, &replacement, 1);
    }

    Ok(result)
  }
}
