//! Tag rendering for collapsed concatenation blocks.

use crate::models::{Block, BlockType};

/// Line terminator used by `text`: CRLF when present anywhere, LF otherwise.
pub fn line_terminator(text: &str) -> &'static str {
  if text.contains("\r\n") { "\r\n" } else { "\n" }
}

/// Render the single element that replaces `block`, if its kind produces one.
pub fn render_tag(block: &Block) -> Option<String> {
  let dest = &block.dest;
  match block.kind {
    BlockType::Css => {
      let media = block
        .media
        .as_deref()
        .map(|media| format!(" media=\"{media}\""))
        .unwrap_or_default();
      Some(format!("<link rel=\"stylesheet\" href=\"{dest}\"{media}/>"))
    }
    _ if block.defer => Some(format!("<script defer src=\"{dest}\"></script>")),
    BlockType::Js => Some(format!("<script src=\"{dest}\"></script>")),
    BlockType::Other(_) => None,
  }
}

/// Render the indented tag together with any conditional wrapper lines.
pub fn render_replacement(block: &Block, linefeed: &str) -> Option<String> {
  let tag = render_tag(block)?;
  let indent = &block.indent;
  let start = block
    .conditional_start
    .as_deref()
    .map(|start| format!("{start}{linefeed}{indent}"))
    .unwrap_or_default();
  let end = block
    .conditional_end
    .as_deref()
    .map(|end| format!("{linefeed}{indent}{end}"))
    .unwrap_or_default();

  Some(format!("{indent}{start}{tag}{end}"))
}
