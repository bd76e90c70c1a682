//! Render one block and swap it into the page

use std::sync::Arc;

use crate::annotate::annotate;
use crate::config::HighlighterConfig;
use crate::error::Error;
use crate::page::{CopyControl, NodeId, Page, RenderedBlock, SharedPage};
use crate::syntax::{self, EngineCache, Transformer};

/// Everything a render needs, shared by every component of a session
#[derive(Clone)]
pub struct Context {
    pub config: Arc<HighlighterConfig>,
    pub engines: Arc<EngineCache>,
    pub transformers: Vec<Arc<dyn Transformer>>,
    pub page: SharedPage,
}

impl Context {
    pub fn new(config: Arc<HighlighterConfig>, engines: Arc<EngineCache>, page: SharedPage) -> Self {
        let transformers = syntax::resolve_transformers(&config.transformers);
        Self {
            config,
            engines,
            transformers,
            page,
        }
    }
}

/// Why a block was left untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Node no longer on the page, or already rendered
    Gone,
    /// Language not on the allow-list
    Disallowed(String),
    EngineUnavailable,
}

#[derive(Debug)]
pub enum RenderOutcome {
    /// Replaced by the node with this id
    Rendered(NodeId),
    Skipped(SkipReason),
    Failed(Error),
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered(_))
    }
}

/// Dark theme if any dark indicator is present, default theme otherwise
pub fn resolve_theme(page: &Page, config: &HighlighterConfig) -> String {
    let root = page.root();
    let indicated = |value: &str| config.dark_indicators.iter().any(|d| d == value);

    let dark = page.prefers_dark()
        || root.classes.iter().any(|c| indicated(c.as_str()))
        || root.attr("data-theme").is_some_and(indicated);

    if dark {
        config.dark_theme.clone()
    } else {
        config.default_theme.clone()
    }
}

/// Class names for a highlight level on a display line
fn level_classes(level: u8) -> [String; 2] {
    ["highlighted".to_string(), format!("hl-{}", level)]
}

/// Render `node` with `theme` and replace it on the page
///
/// Never fails the caller: every problem becomes an outcome.
pub async fn render_block(ctx: &Context, node: NodeId, theme: &str) -> RenderOutcome {
    let captured = ctx.page.write().capture_original(node);
    let Some(original) = captured else {
        return RenderOutcome::Skipped(SkipReason::Gone);
    };

    let annotated = annotate(&original.text);

    if !ctx.config.is_language_allowed(&original.language) {
        tracing::debug!("{}", Error::UnsupportedLanguage(original.language.clone()));
        return RenderOutcome::Skipped(SkipReason::Disallowed(original.language));
    }

    let handle = ctx.engines.ensure(&ctx.config).await;
    let Some(engine) = handle.engine() else {
        return RenderOutcome::Skipped(SkipReason::EngineUnavailable);
    };

    let mut fragment = match syntax::render(
        engine.as_ref(),
        &annotated.display_text,
        &original.language,
        theme,
        &ctx.transformers,
    ) {
        Ok(fragment) => fragment,
        Err(e) => {
            tracing::warn!(language = %original.language, theme, "{}", e);
            return RenderOutcome::Failed(e);
        }
    };

    for (&line, level) in &annotated.levels {
        // Display lines are 1-based; ranges may point past the end
        for class in level_classes(level.get()) {
            fragment.add_line_class(line - 1, &class);
        }
    }

    // Copy what the reader sees, after the transformers stripped their markers
    let rendered = RenderedBlock {
        markup: fragment.to_html(),
        copy: CopyControl::new(&fragment.text()),
        display_text: annotated.display_text,
        levels: annotated.levels,
        theme: theme.to_string(),
    };

    let replaced = ctx.page.write().replace_with_rendered(node, rendered);
    match replaced {
        Some(new_id) => {
            tracing::trace!(?node, ?new_id, language = %original.language, "block rendered");
            RenderOutcome::Rendered(new_id)
        }
        None => RenderOutcome::Skipped(SkipReason::Gone),
    }
}
