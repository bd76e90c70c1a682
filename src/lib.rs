//! glint: highlight the code blocks of a generated documentation page
//!
//! A page is parsed into an in-memory model, its `<pre><code>` blocks are
//! annotated with per-line highlight levels, rendered through a
//! Tree-sitter engine and swapped back in. Theme changes on the page
//! restore every block and render it again.

pub mod annotate;
pub mod assets;
pub mod cli;
pub mod config;
pub mod debug;
pub mod error;
pub mod input;
pub mod logging;
pub mod page;
pub mod pipeline;
pub mod syntax;
pub mod theme;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
