//! Test doubles for the engine, its loader and the clipboard

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use tokio::sync::Semaphore;

use crate::config::HighlighterConfig;
use crate::error::{Error, Result};
use crate::page::{Clipboard, Page, SharedPage};
use crate::pipeline::Context;
use crate::syntax::{Engine, EngineCache, EngineLoader, Fragment};
use crate::theme;

/// Renders every language as plain text
#[derive(Debug, Clone, Default)]
pub struct PlainEngine {
    /// `None` accepts every built-in theme
    themes: Option<Vec<String>>,
}

impl PlainEngine {
    pub fn with_themes(themes: Vec<String>) -> Self {
        Self {
            themes: Some(themes),
        }
    }
}

impl Engine for PlainEngine {
    fn render(&self, code: &str, language: &str, theme: &str) -> Result<Fragment> {
        if let Some(themes) = &self.themes {
            if !themes.iter().any(|t| t == theme) {
                return Err(Error::RenderFailure(format!("theme `{}` is not loaded", theme)));
            }
        }
        let theme = theme::get_builtin_theme(theme)
            .ok_or_else(|| Error::RenderFailure(format!("unknown theme `{}`", theme)))?;
        Ok(Fragment::plain(&theme, language, code))
    }

    fn themes(&self) -> Vec<String> {
        match &self.themes {
            Some(themes) => themes.clone(),
            None => theme::list_builtin_themes()
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

fn plain_engine_for(config: &HighlighterConfig) -> Arc<dyn Engine> {
    Arc::new(PlainEngine::with_themes(config.themes_to_load()))
}

/// Builds a [`PlainEngine`] immediately
#[derive(Debug, Default)]
pub struct PlainLoader {
    constructions: AtomicUsize,
}

impl PlainLoader {
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}

impl EngineLoader for PlainLoader {
    fn load<'a>(&'a self, config: &'a HighlighterConfig) -> BoxFuture<'a, Result<Arc<dyn Engine>>> {
        self.constructions.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(plain_engine_for(config)) })
    }
}

/// Builds a [`PlainEngine`] once [`GatedLoader::open`] is called
#[derive(Debug, Clone)]
pub struct GatedLoader {
    gate: Arc<Semaphore>,
    constructions: Arc<AtomicUsize>,
}

impl GatedLoader {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Semaphore::new(0)),
            constructions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn open(&self) {
        self.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    }

    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }
}

impl EngineLoader for GatedLoader {
    fn load<'a>(&'a self, config: &'a HighlighterConfig) -> BoxFuture<'a, Result<Arc<dyn Engine>>> {
        self.constructions.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| Error::EngineUnavailable(e.to_string()))?;
            Ok(plain_engine_for(config))
        })
    }
}

/// Always fails
#[derive(Debug, Default)]
pub struct FailingLoader {
    attempts: AtomicUsize,
}

impl FailingLoader {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl EngineLoader for FailingLoader {
    fn load<'a>(&'a self, _config: &'a HighlighterConfig) -> BoxFuture<'a, Result<Arc<dyn Engine>>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Err(Error::EngineUnavailable("no grammars".to_string())) })
    }
}

/// Records what was copied, optionally failing the primary write
#[derive(Debug, Default)]
pub struct RecordingClipboard {
    fail_primary: bool,
    primary: Mutex<Vec<String>>,
    legacy: Mutex<Vec<String>>,
}

impl RecordingClipboard {
    pub fn failing_primary() -> Self {
        Self {
            fail_primary: true,
            ..Self::default()
        }
    }

    pub fn primary(&self) -> Vec<String> {
        self.primary.lock().unwrap().clone()
    }

    pub fn legacy(&self) -> Vec<String> {
        self.legacy.lock().unwrap().clone()
    }
}

impl Clipboard for RecordingClipboard {
    fn write_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            if self.fail_primary {
                return Err(Error::ClipboardFailure("permission denied".to_string()));
            }
            self.primary.lock().unwrap().push(text.to_string());
            Ok(())
        })
    }

    fn legacy_copy(&self, text: &str) -> Result<()> {
        self.legacy.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// A pipeline context over `page` with the default config
pub fn context_with(page: Page, loader: impl EngineLoader + 'static) -> Context {
    let config = Arc::new(HighlighterConfig::default());
    let engines = Arc::new(EngineCache::new(Arc::new(loader)));
    Context::new(config, engines, SharedPage::new(page))
}
