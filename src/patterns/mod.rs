//! Catalogue of reference-matching rules for each supported document type.
//!
//! Presets are compiled once per process and shared between every processor that selects
//! them. Callers may bypass the presets with their own rule list.

mod catalog;
mod filters;

pub use catalog::{PathFilter, Pattern, PatternCatalog, PatternSelector, Preset};
pub use filters::{append_js_extension, strip_js_extension};
