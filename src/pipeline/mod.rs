//! Rendering pipeline: per-block render, batch scheduling, theme reaction

mod reactor;
mod render;
mod scheduler;

pub use reactor::ThemeReactor;
pub use render::{Context, RenderOutcome, SkipReason, render_block, resolve_theme};
pub use scheduler::{CycleReport, Scheduler, is_candidate};
