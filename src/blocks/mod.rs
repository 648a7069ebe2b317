//! Concatenation block handling: extraction from markup, tag rendering and replacement.

mod extract;
mod render;
mod replace;

pub use extract::extract_blocks;
pub use render::{line_terminator, render_replacement, render_tag};
pub use replace::BlockReplacer;
