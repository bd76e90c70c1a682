//! Error types shared across the highlighting pipeline
//!
//! None of these are fatal to a page session: the pipeline turns them into
//! per-block outcomes and log lines, and the worst case is a block that
//! stays as plain text.

use std::path::PathBuf;

/// Errors produced by glint components
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The highlighting engine could not be constructed
    #[error("highlighting engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Block language is not on the configured allow-list
    #[error("language `{0}` is not enabled")]
    UnsupportedLanguage(String),

    /// Rendering one block failed
    #[error("render failed: {0}")]
    RenderFailure(String),

    /// Both the primary and the legacy clipboard paths failed
    #[error("clipboard write failed: {0}")]
    ClipboardFailure(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
