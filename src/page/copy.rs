//! Copy control attached to rendered blocks

use std::io::Write;

use base64::Engine as _;
use futures::future::BoxFuture;

use super::NodeId;
use super::shared::SharedPage;
use crate::config::Timings;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CopyState {
    #[default]
    Idle,
    Copied,
}

impl CopyState {
    pub fn as_str(self) -> &'static str {
        match self {
            CopyState::Idle => "idle",
            CopyState::Copied => "copied",
        }
    }

    /// Button text
    pub fn label(self) -> &'static str {
        match self {
            CopyState::Idle => "Copy",
            CopyState::Copied => "Copied",
        }
    }
}

/// The button next to a rendered block; copies the display text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyControl {
    pub text: String,
    pub state: CopyState,
}

impl CopyControl {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            state: CopyState::Idle,
        }
    }
}

pub trait Clipboard: Send + Sync {
    /// Primary asynchronous clipboard write
    fn write_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Selection-based fallback
    fn legacy_copy(&self, text: &str) -> Result<()>;
}

/// OSC 52 "set clipboard" sequence for `text`
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{}\x07", encoded)
}

/// System clipboard through arboard, falling back to OSC 52 on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn write_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<()>> {
        let text = text.to_string();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let mut clipboard = arboard::Clipboard::new()
                    .map_err(|e| Error::ClipboardFailure(format!("clipboard not available: {}", e)))?;
                clipboard
                    .set_text(text)
                    .map_err(|e| Error::ClipboardFailure(format!("failed to set clipboard text: {}", e)))
            })
            .await
            .map_err(|e| Error::ClipboardFailure(format!("clipboard task aborted: {}", e)))?
        })
    }

    fn legacy_copy(&self, text: &str) -> Result<()> {
        let mut out = std::io::stdout();
        out.write_all(osc52_sequence(text).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

/// Copy a rendered block's display text, flash `Copied`, then revert
///
/// Clipboard failures are logged; the control still flips to `Copied`.
pub async fn copy_block(
    page: &SharedPage,
    node: NodeId,
    clipboard: &dyn Clipboard,
    timings: &Timings,
) -> Result<()> {
    let text = page
        .read()
        .copy_text(node)
        .ok_or_else(|| Error::ClipboardFailure("block has no copy control".to_string()))?;

    if let Err(e) = clipboard.write_text(&text).await {
        tracing::debug!("primary clipboard write failed, using fallback: {}", e);
        if let Err(e) = clipboard.legacy_copy(&text) {
            tracing::warn!("copy failed: {}", e);
        }
    }

    page.set_copy_state(node, CopyState::Copied);
    tokio::time::sleep(timings.copy_revert()).await;
    page.set_copy_state(node, CopyState::Idle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, RenderedBlock};
    use crate::testing::RecordingClipboard;

    fn page_with_rendered_block() -> (SharedPage, NodeId) {
        let mut page = Page::new();
        let id = page.add_block(&["language-rust"], "let a = 1;");
        page.capture_original(id);
        let id = page
            .replace_with_rendered(
                id,
                RenderedBlock {
                    markup: String::new(),
                    display_text: "let a = 1;".to_string(),
                    levels: Default::default(),
                    theme: "nord".to_string(),
                    copy: CopyControl::new("let a = 1;"),
                },
            )
            .unwrap();
        (SharedPage::new(page), id)
    }

    fn copy_state(page: &SharedPage, id: NodeId) -> CopyState {
        page.read().node(id).unwrap().rendered().unwrap().copy.state
    }

    #[test]
    fn test_osc52_sequence() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_flashes_and_reverts() {
        let (page, id) = page_with_rendered_block();
        let clipboard = RecordingClipboard::default();
        let timings = Timings::default();

        let copying = copy_block(&page, id, &clipboard, &timings);
        tokio::pin!(copying);
        // Runs up to the revert timer
        assert!(futures::poll!(copying.as_mut()).is_pending());
        assert_eq!(copy_state(&page, id), CopyState::Copied);
        assert_eq!(clipboard.primary(), vec!["let a = 1;"]);

        copying.await.unwrap();
        assert_eq!(copy_state(&page, id), CopyState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_failure_uses_legacy_copy() {
        let (page, id) = page_with_rendered_block();
        let clipboard = RecordingClipboard::failing_primary();

        copy_block(&page, id, &clipboard, &Timings::immediate())
            .await
            .unwrap();
        assert!(clipboard.primary().is_empty());
        assert_eq!(clipboard.legacy(), vec!["let a = 1;"]);
    }

    #[tokio::test]
    async fn test_pristine_block_has_nothing_to_copy() {
        let mut page = Page::new();
        let id = page.add_block(&[], "x");
        let page = SharedPage::new(page);
        let clipboard = RecordingClipboard::default();
        assert!(matches!(
            copy_block(&page, id, &clipboard, &Timings::immediate()).await,
            Err(Error::ClipboardFailure(_))
        ));
    }
}
