//! Data structures exchanged between the block extractor, the processor and callers.

use serde::{Deserialize, Serialize};

/// Kind of bundle a concatenation block produces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
  /// Stylesheet bundle rendered as a `<link>` element.
  Css,
  /// Script bundle rendered as a `<script>` element.
  Js,
  /// Any other directive type; renders no tag.
  Other(String),
}

impl From<String> for BlockType {
  fn from(value: String) -> Self {
    match value.as_str() {
      "css" => Self::Css,
      "js" => Self::Js,
      _ => Self::Other(value),
    }
  }
}

impl From<&str> for BlockType {
  fn from(value: &str) -> Self {
    Self::from(value.to_string())
  }
}

impl From<BlockType> for String {
  fn from(value: BlockType) -> Self {
    match value {
      BlockType::Css => "css".into(),
      BlockType::Js => "js".into(),
      BlockType::Other(name) => name,
    }
  }
}

/// A bundler directive identified upstream that collapses into a single tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
  /// Original source lines, from the opening directive through the closing one.
  pub raw: Vec<String>,
  /// Path of the bundle the rendered tag should reference.
  pub dest: String,
  /// Bundle kind.
  #[serde(rename = "type")]
  pub kind: BlockType,
  /// Leading whitespace reproduced in front of the rendered tag.
  #[serde(default)]
  pub indent: String,
  /// Optional opening wrapper line, e.g. a legacy conditional comment.
  #[serde(default)]
  pub conditional_start: Option<String>,
  /// Optional closing wrapper line.
  #[serde(default)]
  pub conditional_end: Option<String>,
  /// Media query copied onto rendered stylesheet links.
  #[serde(default)]
  pub media: Option<String>,
  /// Whether the rendered script loads deferred.
  #[serde(default)]
  pub defer: bool,
  /// Asset references found between the directives.
  #[serde(default)]
  pub sources: Vec<String>,
  /// Alternate search path named in the opening directive.
  #[serde(default)]
  pub search_path: Vec<String>,
}

impl Block {
  /// Create a block with no wrapper, media query or recorded sources.
  pub fn new(kind: impl Into<BlockType>, dest: impl Into<String>, raw: Vec<String>) -> Self {
    Self {
      raw,
      dest: dest.into(),
      kind: kind.into(),
      indent: String::new(),
      conditional_start: None,
      conditional_end: None,
      media: None,
      defer: false,
      sources: Vec::new(),
      search_path: Vec::new(),
    }
  }
}

/// A document ready for processing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
  /// Full text of the document.
  pub content: String,
  /// Concatenation blocks, in document order.
  #[serde(default)]
  pub blocks: Vec<Block>,
  /// Directories consulted when resolving references.
  #[serde(default)]
  pub search_path: Vec<String>,
}

impl Document {
  /// Wrap raw content with no blocks and an empty search path.
  pub fn from_content(content: impl Into<String>) -> Self {
    Self {
      content: content.into(),
      ..Self::default()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserializes_upstream_document_shape() {
    let document: Document = serde_json::from_str(
      r#"{
        "content": "<html></html>",
        "blocks": [{
          "raw": ["<!-- build:css style.min.css -->", "<!-- endbuild -->"],
          "dest": "style.min.css",
          "type": "css",
          "indent": "  ",
          "conditionalStart": "<!--[if lt IE 9]>",
          "media": "print"
        }],
        "searchPath": ["dist"]
      }"#,
    )
    .unwrap();

    let block = &document.blocks[0];
    assert_eq!(block.kind, BlockType::Css);
    assert_eq!(block.conditional_start.as_deref(), Some("<!--[if lt IE 9]>"));
    assert_eq!(block.conditional_end, None);
    assert!(!block.defer);
    assert_eq!(document.search_path, vec!["dist".to_string()]);
  }

  #[test]
  fn keeps_unknown_block_types() {
    let kind = BlockType::from("html");
    assert_eq!(kind, BlockType::Other("html".into()));
    assert_eq!(String::from(kind), "html");
  }
}
