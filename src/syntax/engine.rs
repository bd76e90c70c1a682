//! Engine adapter: construct the highlighting engine once, share it
//!
//! Construction may be slow (grammar libraries are opened on a blocking
//! task), so the first caller starts it and every concurrent caller awaits
//! the same pending result. A failed construction is remembered as
//! [`EngineHandle::Unavailable`]; callers never see the error itself.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::BoxFuture;
use tokio::sync::OnceCell;

use super::markup::Fragment;
use crate::config::HighlighterConfig;
use crate::error::Result;

/// Converts source + language + theme into per-line markup
pub trait Engine: Send + Sync {
    fn render(&self, code: &str, language: &str, theme: &str) -> Result<Fragment>;

    /// Themes this engine can render with
    fn themes(&self) -> Vec<String>;
}

/// Builds an [`Engine`] for a configuration
pub trait EngineLoader: Send + Sync {
    fn load<'a>(&'a self, config: &'a HighlighterConfig) -> BoxFuture<'a, Result<Arc<dyn Engine>>>;
}

/// Outcome of engine construction
#[derive(Clone)]
pub enum EngineHandle {
    Ready(Arc<dyn Engine>),
    Unavailable,
}

impl EngineHandle {
    pub fn engine(&self) -> Option<&Arc<dyn Engine>> {
        match self {
            EngineHandle::Ready(engine) => Some(engine),
            EngineHandle::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, EngineHandle::Ready(_))
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineHandle::Ready(engine) => f
                .debug_tuple("Ready")
                .field(&engine.themes())
                .finish(),
            EngineHandle::Unavailable => f.write_str("Unavailable"),
        }
    }
}

/// What an engine instance is memoized by
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineKey {
    themes: Vec<String>,
    languages: Vec<String>,
    source: PathBuf,
}

impl EngineKey {
    pub fn from_config(config: &HighlighterConfig) -> Self {
        let mut themes = config.themes_to_load();
        themes.sort();
        let mut languages = config.languages.clone();
        languages.sort();
        languages.dedup();
        Self {
            themes,
            languages,
            source: config.engine_source.clone(),
        }
    }
}

/// Memoized engine construction, one slot per [`EngineKey`]
pub struct EngineCache {
    loader: Arc<dyn EngineLoader>,
    slots: Mutex<HashMap<EngineKey, Arc<OnceCell<EngineHandle>>>>,
}

impl EngineCache {
    pub fn new(loader: Arc<dyn EngineLoader>) -> Self {
        Self {
            loader,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Get the engine for `config`, constructing it on first use
    pub async fn ensure(&self, config: &HighlighterConfig) -> EngineHandle {
        let key = EngineKey::from_config(config);
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key).or_default())
        };

        slot.get_or_init(|| async {
            match self.loader.load(config).await {
                Ok(engine) => {
                    tracing::info!(themes = ?engine.themes(), "highlighting engine ready");
                    EngineHandle::Ready(engine)
                }
                Err(e) => {
                    tracing::warn!("highlighting disabled: {}", e);
                    EngineHandle::Unavailable
                }
            }
        })
        .await
        .clone()
    }

    /// The settled handle for `config`, without starting construction
    #[cfg(test)]
    pub fn peek(&self, config: &HighlighterConfig) -> Option<EngineHandle> {
        let key = EngineKey::from_config(config);
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(&key).and_then(|slot| slot.get().cloned())
    }
}
