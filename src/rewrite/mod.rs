//! Reference rewriting: scan text with a pattern catalogue and swap in resolved paths.

mod reference;
mod rewriter;

pub use reference::ReferenceParts;
pub use rewriter::{resolve_reference, rewrite};
