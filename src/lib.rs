#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod blocks;
pub mod config;
pub mod error;
pub mod finder;
pub mod models;
pub mod patterns;
pub mod processor;
pub mod rewrite;

pub use config::RewriteConfig;
pub use error::{BlockError, ConfigError};
pub use finder::{Finder, SummaryFinder};
pub use models::{Block, BlockType, Document};
pub use patterns::{Pattern, PatternCatalog, PatternSelector, Preset};
pub use processor::{DocumentLoader, FsDocumentLoader, LogSink, ProcessInput, Processor};
