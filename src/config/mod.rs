//! Highlighter configuration
//!
//! Loaded once from `~/.config/glint/init.rhai` (or a JSON asset) and then
//! frozen; components receive it as an `Arc<HighlighterConfig>`.

mod engine;
mod settings;

pub use engine::ConfigEngine;
pub use settings::{FALLBACK_LANGUAGE, HighlighterConfig, Timings, default_engine_source};
