//! The page glint post-processes

mod copy;
mod document;
mod html;
mod shared;

pub use copy::{Clipboard, CopyControl, CopyState, SystemClipboard, copy_block, osc52_sequence};
pub use document::{
    BlockNode, Content, NodeId, OriginalSource, Page, ReadyState, RenderedBlock, RootElement,
    TRANSIENT_CLASSES, language_tag,
};
pub use shared::{SharedPage, ThemeEvent};

/// Added to candidates while a cycle is processing them
pub const LOADING_CLASS: &str = "glint-loading";

/// Marks a node glint produced
pub const RENDERED_CLASS: &str = "glint-rendered";

/// The copy button on a rendered block
pub const COPY_CLASS: &str = "glint-copy";
