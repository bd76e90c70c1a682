//! Syntax highlighting engine adapter
//!
//! The engine is treated as an opaque capability: Tree-sitter grammars
//! loaded from the configured directory, themes from the built-in set.
//! Everything above this module talks to it through [`EngineCache`] and
//! [`render`].

mod engine;
mod highlighter;
mod languages;
mod markup;
mod metadata;
mod transformers;
mod treesitter;

use std::sync::Arc;

pub use engine::{Engine, EngineCache, EngineHandle, EngineKey, EngineLoader};
pub use highlighter::{Highlight, HighlightKind, HighlightedLine, highlight_source};
pub use languages::{Language, LanguageRegistry, canonical_tag};
pub use markup::{Fragment, RenderedLine, Token, escape_html};
pub use metadata::{GrammarMetadata, TREE_SITTER_ABI_VERSION};
pub use transformers::{NotationTransformer, Transformer};
pub use treesitter::{TreeSitterEngine, TreeSitterLoader};

use crate::error::Result;

/// Resolve configured notation transformer names, skipping unknown ones
pub fn resolve_transformers(names: &[String]) -> Vec<Arc<dyn Transformer>> {
    transformers::resolve(names)
}

/// Render `code` and run the post-processing passes over the result
pub fn render(
    engine: &dyn Engine,
    code: &str,
    language: &str,
    theme: &str,
    transformers: &[Arc<dyn Transformer>],
) -> Result<Fragment> {
    let mut fragment = engine.render(code, language, theme)?;
    for transformer in transformers {
        transformer.apply(&mut fragment);
    }
    Ok(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::PlainEngine;

    #[test]
    fn test_render_applies_transformers_in_order() {
        let engine = PlainEngine::default();
        let passes = resolve_transformers(&[
            "notation-diff".to_string(),
            "notation-missing".to_string(),
        ]);

        let fragment = render(&engine, "a // [!code ++]\nb", "text", "nord", &passes).unwrap();
        assert_eq!(fragment.text(), "a\nb");
        assert!(fragment.lines[0].has_class("add"));
        assert_eq!(fragment.theme, "nord");
    }
}
