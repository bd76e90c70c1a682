//! Key handling for `glint watch`

mod handler;

pub use handler::{WatchCommand, handle_event};
