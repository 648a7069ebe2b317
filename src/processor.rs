//! Orchestrates block replacement and reference rewriting for one document at a time.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::blocks::{BlockReplacer, extract_blocks};
use crate::error::ConfigError;
use crate::finder::Finder;
use crate::models::Document;
use crate::patterns::{PatternCatalog, PatternSelector};
use crate::rewrite::rewrite;

/// Receives human readable progress messages.
pub type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Produces a [`Document`] for a path handed to [`Processor::process`].
pub trait DocumentLoader: Send + Sync {
  /// Load the document stored at `path`.
  fn load(&self, path: &Path) -> Result<Document>;
}

/// Reads documents from disk and extracts their concatenation blocks.
///
/// The search path defaults to the directory holding the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDocumentLoader;

impl DocumentLoader for FsDocumentLoader {
  fn load(&self, path: &Path) -> Result<Document> {
    let content =
      fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let blocks = extract_blocks(&content)
      .with_context(|| format!("failed to extract blocks from {}", path.display()))?;

    let directory = path
      .parent()
      .map(|parent| parent.to_string_lossy().replace('\\', "/"))
      .filter(|parent| !parent.is_empty())
      .unwrap_or_else(|| ".".to_string());

    Ok(Document {
      content,
      blocks,
      search_path: vec![directory],
    })
  }
}

/// Input accepted by [`Processor::process`].
#[derive(Debug, Clone)]
pub enum ProcessInput {
  /// Path handed to the configured [`DocumentLoader`].
  Path(PathBuf),
  /// A document that was already parsed by the caller.
  Document(Document),
}

impl From<&str> for ProcessInput {
  fn from(value: &str) -> Self {
    Self::Path(PathBuf::from(value))
  }
}

impl From<String> for ProcessInput {
  fn from(value: String) -> Self {
    Self::Path(PathBuf::from(value))
  }
}

impl From<&Path> for ProcessInput {
  fn from(value: &Path) -> Self {
    Self::Path(value.to_path_buf())
  }
}

impl From<PathBuf> for ProcessInput {
  fn from(value: PathBuf) -> Self {
    Self::Path(value)
  }
}

impl From<Document> for ProcessInput {
  fn from(value: Document) -> Self {
    Self::Document(value)
  }
}

/// Rewrites documents so their asset references point at revved files.
///
/// A processor holds no per-document state and can be shared between threads.
pub struct Processor<'a> {
  catalog: PatternCatalog,
  finder: &'a dyn Finder,
  loader: Box<dyn DocumentLoader + 'a>,
  log: LogSink,
  strict: bool,
}

impl<'a> Processor<'a> {
  /// Start configuring a processor.
  pub fn builder() -> ProcessorBuilder<'a> {
    ProcessorBuilder::default()
  }

  /// Rules applied by [`Processor::replace_with_revved`].
  pub fn catalog(&self) -> &PatternCatalog {
    &self.catalog
  }

  /// Collapse blocks, then rewrite references, returning the final text.
  ///
  /// A non-empty `asset_search_path` replaces the document's own search path.
  pub fn process(
    &self,
    input: impl Into<ProcessInput>,
    asset_search_path: Option<&[String]>,
  ) -> Result<String> {
    let mut document = match input.into() {
      ProcessInput::Path(path) => self.loader.load(&path)?,
      ProcessInput::Document(document) => document,
    };

    if let Some(search_path) = asset_search_path.filter(|paths| !paths.is_empty()) {
      document.search_path = search_path.to_vec();
    }

    tracing::debug!(
      blocks = document.blocks.len(),
      search_path = ?document.search_path,
      "processing document"
    );

    let content = self.replace_blocks(&document)?;
    self.replace_with_revved(&content, &document.search_path)
  }

  /// Replace the document's concatenation blocks with their rendered tags.
  pub fn replace_blocks(&self, document: &Document) -> Result<String> {
    BlockReplacer::new(self.strict).replace(document)
  }

  /// Rewrite every reference matched by the catalogue.
  pub fn replace_with_revved(&self, content: &str, search_path: &[String]) -> Result<String> {
    rewrite(
      content,
      self.catalog.patterns(),
      search_path,
      self.finder,
      &*self.log,
    )
  }
}

impl fmt::Debug for Processor<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Processor")
      .field("catalog", &self.catalog)
      .field("strict", &self.strict)
      .finish_non_exhaustive()
  }
}

/// Collects the collaborators of a [`Processor`].
#[derive(Default)]
pub struct ProcessorBuilder<'a> {
  selector: Option<PatternSelector>,
  finder: Option<&'a dyn Finder>,
  loader: Option<Box<dyn DocumentLoader + 'a>>,
  log: Option<LogSink>,
  strict: bool,
}

impl<'a> ProcessorBuilder<'a> {
  /// Choose the rule catalogue: a preset name or a custom rule list.
  pub fn patterns(mut self, selector: impl Into<PatternSelector>) -> Self {
    self.selector = Some(selector.into());
    self
  }

  /// Shorthand for selecting a preset by name.
  pub fn preset(self, name: &str) -> Self {
    self.patterns(name)
  }

  /// Collaborator resolving references to revved paths.
  pub fn finder(mut self, finder: &'a dyn Finder) -> Self {
    self.finder = Some(finder);
    self
  }

  /// Loader used when `process` receives a path. Defaults to [`FsDocumentLoader`].
  pub fn loader(mut self, loader: impl DocumentLoader + 'a) -> Self {
    self.loader = Some(Box::new(loader));
    self
  }

  /// Sink for progress messages. Defaults to discarding them.
  pub fn log<F>(mut self, sink: F) -> Self
  where
    F: Fn(&str) + Send + Sync + 'static,
  {
    self.log = Some(Arc::new(sink));
    self
  }

  /// Fail when a block cannot be found instead of skipping it.
  pub fn strict(mut self, strict: bool) -> Self {
    self.strict = strict;
    self
  }

  /// Validate the configuration and build the processor.
  pub fn build(self) -> Result<Processor<'a>, ConfigError> {
    let selector = self.selector.ok_or(ConfigError::MissingPatterns)?;
    let catalog = PatternCatalog::resolve(selector)?;
    let finder = self.finder.ok_or(ConfigError::MissingFinder)?;

    Ok(Processor {
      catalog,
      finder,
      loader: self.loader.unwrap_or_else(|| Box::new(FsDocumentLoader)),
      log: self.log.unwrap_or_else(|| Arc::new(|_: &str| {})),
      strict: self.strict,
    })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use tempfile::tempdir;

  use super::*;
  use crate::error::BlockError;
  use crate::finder::SummaryFinder;
  use crate::models::Block;

  fn unchanged(path: &str, _: &[String]) -> Result<String> {
    Ok(path.to_string())
  }

  #[test]
  fn requires_patterns_and_finder() {
    let err = Processor::builder().finder(&unchanged).build().unwrap_err();
    assert!(matches!(err, ConfigError::MissingPatterns));

    let err = Processor::builder().preset("html").build().unwrap_err();
    assert!(matches!(err, ConfigError::MissingFinder));

    let err = Processor::builder()
      .preset("xml")
      .finder(&unchanged)
      .build()
      .unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedPreset(_)));
  }

  #[test]
  fn returns_content_unchanged_without_blocks_or_references() {
    let processor = Processor::builder()
      .preset("html")
      .finder(&unchanged)
      .build()
      .unwrap();
    let document = Document::from_content("<html><body><p>plain</p></body></html>");

    let result = processor.process(document.clone(), None).unwrap();
    assert_eq!(result, document.content);
  }

  #[test]
  fn renders_print_stylesheet_inside_conditional_wrapper() {
    let raw = vec![
      "  <!-- build:css style.min.css -->".to_string(),
      "  <link rel=\"stylesheet\" href=\"a.css\" media=\"print\">".to_string(),
      "  <!-- endbuild -->".to_string(),
    ];
    let mut block = Block::new("css", "style.min.css", raw.clone());
    block.indent = "  ".into();
    block.media = Some("print".into());
    block.conditional_start = Some("<!--[if IE]>".into());
    block.conditional_end = Some("<![endif]-->".into());
    let document = Document {
      content: format!("<head>\n{}\n</head>", raw.join("\n")),
      blocks: vec![block],
      search_path: Vec::new(),
    };

    let processor = Processor::builder()
      .preset("html")
      .finder(&unchanged)
      .build()
      .unwrap();
    let result = processor.process(document, None).unwrap();

    assert_eq!(
      result,
      "<head>\n  <!--[if IE]>\n  <link rel=\"stylesheet\" href=\"style.min.css\" media=\"print\"/>\n  <![endif]-->\n</head>"
    );
  }

  #[test]
  fn revs_the_bundle_tag_after_collapsing_the_block() {
    let raw = vec![
      "<!-- build:js app.min.js -->".to_string(),
      "<script defer src=\"a.js\"></script>".to_string(),
      "<!-- endbuild -->".to_string(),
    ];
    let mut block = Block::new("js", "app.min.js", raw.clone());
    block.defer = true;
    let document = Document {
      content: raw.join("\n"),
      blocks: vec![block],
      search_path: vec!["dist".into()],
    };
    let finder = SummaryFinder::new([("dist/app.min.js", "dist/app.min.0c0ffee.js")]);

    let processor = Processor::builder()
      .preset("html")
      .finder(&finder)
      .build()
      .unwrap();
    let result = processor.process(document, None).unwrap();

    assert_eq!(result, "<script defer src=\"app.min.0c0ffee.js\"></script>");
  }

  #[test]
  fn override_search_path_replaces_document_search_path() {
    let seen = Mutex::new(Vec::new());
    let finder = |path: &str, search: &[String]| -> Result<String> {
      seen.lock().unwrap().push(search.to_vec());
      Ok(path.to_string())
    };
    let processor = Processor::builder()
      .preset("css")
      .finder(&finder)
      .build()
      .unwrap();
    let document = Document {
      content: ".a{background:url(a.png)}".into(),
      blocks: Vec::new(),
      search_path: vec!["src".into()],
    };

    processor
      .process(document.clone(), Some(&["dist".to_string()]))
      .unwrap();
    processor.process(document, Some(&[])).unwrap();

    assert_eq!(seen.lock().unwrap().as_slice(), [
      vec!["dist".to_string()],
      vec!["src".to_string()],
    ]);
  }

  #[test]
  fn forwards_messages_to_log_sink() {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&messages);
    let finder = SummaryFinder::new([("a.png", "a.1.png")]);
    let processor = Processor::builder()
      .preset("css")
      .finder(&finder)
      .log(move |message| sink.lock().unwrap().push(message.to_string()))
      .build()
      .unwrap();

    let result = processor
      .process(Document::from_content(".a{background:url('a.png')}"), None)
      .unwrap();

    assert_eq!(result, ".a{background:url('a.1.png')}");
    assert_eq!(messages.lock().unwrap().as_slice(), [
      "Update the CSS to reference our revved images".to_string(),
      "url('a.png') changed to url('a.1.png')".to_string(),
    ]);
  }

  #[test]
  fn strict_mode_surfaces_missing_blocks() {
    let processor = Processor::builder()
      .preset("html")
      .finder(&unchanged)
      .strict(true)
      .build()
      .unwrap();
    let document = Document {
      content: "<html></html>".into(),
      blocks: vec![Block::new("js", "app.js", vec!["<!-- gone -->".into()])],
      search_path: Vec::new(),
    };

    let err = processor.process(document, None).unwrap_err();
    assert!(err.downcast_ref::<BlockError>().is_some());
  }

  #[test]
  fn loads_documents_from_disk() {
    let dir = tempdir().unwrap();
    let index = dir.path().join("index.html");
    fs::write(
      &index,
      "<html>\n  <head>\n    <!-- build:css css/site.css -->\n    <link rel=\"stylesheet\" href=\"css/a.css\">\n    <!-- endbuild -->\n  </head>\n  <body><img src=\"img/logo.png\"></body>\n</html>\n",
    )
    .unwrap();

    let root = dir.path().to_string_lossy().replace('\\', "/");
    let finder = SummaryFinder::new([
      (format!("{root}/css/site.css"), format!("{root}/css/site.ab.css")),
      (format!("{root}/img/logo.png"), format!("{root}/img/logo.cd.png")),
    ]);
    let processor = Processor::builder()
      .preset("html")
      .finder(&finder)
      .build()
      .unwrap();

    let result = processor.process(index.as_path(), None).unwrap();
    assert_eq!(
      result,
      "<html>\n  <head>\n    <link rel=\"stylesheet\" href=\"css/site.ab.css\"/>\n  </head>\n  <body><img src=\"img/logo.cd.png\"></body>\n</html>\n"
    );
  }

  #[test]
  fn missing_input_file_is_reported() {
    let dir = tempdir().unwrap();
    let processor = Processor::builder()
      .preset("html")
      .finder(&unchanged)
      .build()
      .unwrap();

    let err = processor
      .process(dir.path().join("absent.html"), None)
      .unwrap_err();
    assert!(err.to_string().starts_with("failed to read"));
  }

  #[test]
  fn custom_loaders_receive_paths() {
    struct Fixed;

    impl DocumentLoader for Fixed {
      fn load(&self, path: &Path) -> Result<Document> {
        Ok(Document::from_content(format!(
          "<a href=\"{}\">",
          path.display()
        )))
      }
    }

    let finder = SummaryFinder::new([("about.html", "about.77.html")]);
    let processor = Processor::builder()
      .preset("html")
      .finder(&finder)
      .loader(Fixed)
      .build()
      .unwrap();

    assert_eq!(
      processor.process("about.html", None).unwrap(),
      "<a href=\"about.77.html\">"
    );
  }
}
