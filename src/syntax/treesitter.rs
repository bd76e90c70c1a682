//! Tree-sitter backed [`Engine`]

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;

use super::engine::{Engine, EngineLoader};
use super::highlighter::highlight_source;
use super::languages::{Language, LanguageRegistry, canonical_tag};
use super::markup::{Fragment, RenderedLine, Token};
use crate::config::{FALLBACK_LANGUAGE, HighlighterConfig};
use crate::error::{Error, Result};
use crate::theme::{self, Theme};

/// Grammars and themes loaded for one configuration
pub struct TreeSitterEngine {
    registry: LanguageRegistry,
    themes: HashMap<String, Theme>,
}

impl TreeSitterEngine {
    /// Open the grammar directory and load everything the config asks for
    ///
    /// Individual grammars or preload themes that fail to load are skipped
    /// with a warning; a missing directory or default theme fails the
    /// whole engine.
    pub fn build(config: &HighlighterConfig) -> Result<Self> {
        if !config.engine_source.is_dir() {
            return Err(Error::EngineUnavailable(format!(
                "grammar directory {} not found",
                config.engine_source.display()
            )));
        }

        let mut themes = HashMap::new();
        for name in config.themes_to_load() {
            match theme::get_builtin_theme(&name) {
                Some(theme) => {
                    themes.insert(name, theme);
                }
                None => tracing::warn!(theme = %name, "unknown theme, not loaded"),
            }
        }
        if !themes.contains_key(&config.default_theme) {
            return Err(Error::EngineUnavailable(format!(
                "default theme `{}` is not available",
                config.default_theme
            )));
        }

        let mut registry = LanguageRegistry::open(&config.engine_source);
        let outdated = registry.outdated();
        if !outdated.is_empty() {
            tracing::warn!(grammars = ?outdated, "skipping grammars built for another ABI");
        }
        for language in &config.languages {
            let name = canonical_tag(language);
            if name == FALLBACK_LANGUAGE {
                continue;
            }
            if let Err(e) = registry.load(&name) {
                tracing::warn!(language = %name, "{}", e);
            }
        }
        tracing::debug!(
            dir = %registry.grammars_dir().display(),
            grammars = ?registry.loaded_names(),
            "grammars loaded"
        );

        Ok(Self { registry, themes })
    }
}

impl Engine for TreeSitterEngine {
    fn render(&self, code: &str, language: &str, theme: &str) -> Result<Fragment> {
        let theme = self
            .themes
            .get(theme)
            .ok_or_else(|| Error::RenderFailure(format!("theme `{}` is not loaded", theme)))?;

        if language == FALLBACK_LANGUAGE {
            return Ok(Fragment::plain(theme, language, code));
        }

        let grammar = self.registry.get(language).ok_or_else(|| {
            Error::RenderFailure(format!("no grammar loaded for `{}`", language))
        })?;

        let highlighted = highlight_source(grammar, Language::from_tag(language), code)?;

        let mut fragment = Fragment::new(theme, language);
        fragment.lines = code
            .split('\n')
            .zip(highlighted.iter())
            .map(|(text, spans)| RenderedLine {
                tokens: spans
                    .runs(text)
                    .into_iter()
                    .map(|(run, kind)| Token::styled(run, theme.style_for(kind)))
                    .collect(),
                classes: Vec::new(),
            })
            .collect();
        Ok(fragment)
    }

    fn themes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.themes.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Loads a [`TreeSitterEngine`] on the blocking pool
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterLoader;

impl EngineLoader for TreeSitterLoader {
    fn load<'a>(&'a self, config: &'a HighlighterConfig) -> BoxFuture<'a, Result<Arc<dyn Engine>>> {
        let config = config.clone();
        Box::pin(async move {
            let engine = tokio::task::spawn_blocking(move || TreeSitterEngine::build(&config))
                .await
                .map_err(|e| Error::EngineUnavailable(format!("engine construction aborted: {}", e)))??;
            Ok(Arc::new(engine) as Arc<dyn Engine>)
        })
    }
}
