use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::syntax::canonical_tag;

/// Language tag used for blocks with no classification
pub const FALLBACK_LANGUAGE: &str = "text";

/// Page-wide highlighter configuration
///
/// Built once at startup and shared read-only (`Arc`) with every component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlighterConfig {
    /// Theme for light pages
    pub default_theme: String,
    /// Theme used whenever a dark indicator is present
    pub dark_theme: String,
    /// Languages the engine may render; `text` is always allowed
    pub languages: Vec<String>,
    /// Extra themes to load alongside the default and dark ones
    pub preload_themes: Vec<String>,
    /// Directory holding the compiled grammar libraries
    pub engine_source: PathBuf,
    /// Notation transformers applied after rendering, by name
    pub transformers: Vec<String>,
    /// Blocks carrying any of these classes are never touched
    pub exclusion_markers: Vec<String>,
    /// Root classes or `data-theme` values that mean "dark"
    pub dark_indicators: Vec<String>,
    /// Blocks rendered concurrently per batch
    pub batch_size: usize,
    pub timings: Timings,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            default_theme: "gruvbox-light".to_string(),
            dark_theme: "gruvbox-dark".to_string(),
            languages: [
                "rust",
                "python",
                "javascript",
                "typescript",
                "go",
                "c",
                "cpp",
                "json",
                "toml",
                "bash",
                "html",
                "css",
                "yaml",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            preload_themes: Vec::new(),
            engine_source: default_engine_source(),
            transformers: Vec::new(),
            exclusion_markers: ["language-repl", "repl", "nohighlight", "no-highlight"]
                .into_iter()
                .map(String::from)
                .collect(),
            dark_indicators: ["dark", "navy", "coal", "ayu"]
                .into_iter()
                .map(String::from)
                .collect(),
            batch_size: 5,
            timings: Timings::default(),
        }
    }
}

impl HighlighterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a block tagged `language` may be rendered
    ///
    /// Both sides are compared by canonical tag, so `js` in the list allows
    /// `language-javascript` blocks and the other way round.
    pub fn is_language_allowed(&self, language: &str) -> bool {
        let language = canonical_tag(language);
        language == FALLBACK_LANGUAGE || self.languages.iter().any(|l| canonical_tag(l) == language)
    }

    /// Every theme the engine must have loaded, deduplicated, in config order
    pub fn themes_to_load(&self) -> Vec<String> {
        let mut themes: Vec<String> = Vec::new();
        for name in [&self.default_theme, &self.dark_theme]
            .into_iter()
            .chain(self.preload_themes.iter())
        {
            if !themes.contains(name) {
                themes.push(name.clone());
            }
        }
        themes
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Fixed delays used by the scheduler, reactor and copy control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Startup trigger letting a cooperating renderer finish first
    pub short_delay_ms: u64,
    /// Late startup trigger in case earlier ones were missed
    pub fallback_delay_ms: u64,
    /// Pause between a theme restore and the next cycle
    pub settle_ms: u64,
    /// How long a copy button shows its "copied" state
    pub copy_revert_ms: u64,
}

impl Timings {
    /// All delays zero, for tests and one-shot rendering
    pub const fn immediate() -> Self {
        Self {
            short_delay_ms: 0,
            fallback_delay_ms: 0,
            settle_ms: 0,
            copy_revert_ms: 0,
        }
    }

    pub fn short_delay(&self) -> Duration {
        Duration::from_millis(self.short_delay_ms)
    }

    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn copy_revert(&self) -> Duration {
        Duration::from_millis(self.copy_revert_ms)
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            short_delay_ms: 100,
            fallback_delay_ms: 1000,
            settle_ms: 50,
            copy_revert_ms: 2000,
        }
    }
}

/// `~/.config/glint/grammars`
pub fn default_engine_source() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("glint").join("grammars"))
        .unwrap_or_else(|| PathBuf::from("grammars"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_language_always_allowed() {
        let config = HighlighterConfig {
            languages: vec!["rust".to_string()],
            ..HighlighterConfig::default()
        };
        assert!(config.is_language_allowed("rust"));
        assert!(config.is_language_allowed(FALLBACK_LANGUAGE));
        assert!(!config.is_language_allowed("cobol"));
    }

    #[test]
    fn test_allow_list_aliases_match_canonical_tags() {
        let config = HighlighterConfig::from_json(r#"{ "languages": ["js", "sh", "C++"] }"#).unwrap();
        assert!(config.is_language_allowed("javascript"));
        assert!(config.is_language_allowed("bash"));
        assert!(config.is_language_allowed("cpp"));
        assert!(config.is_language_allowed("js"));
        assert!(!config.is_language_allowed("python"));
    }

    #[test]
    fn test_themes_to_load_dedups() {
        let config = HighlighterConfig {
            default_theme: "nord".to_string(),
            dark_theme: "dracula".to_string(),
            preload_themes: vec!["nord".to_string(), "solarized-dark".to_string()],
            ..HighlighterConfig::default()
        };
        assert_eq!(
            config.themes_to_load(),
            vec!["nord", "dracula", "solarized-dark"]
        );
    }

    #[test]
    fn test_json_fills_missing_fields() {
        let config = HighlighterConfig::from_json(r#"{ "dark_theme": "nord" }"#).unwrap();
        assert_eq!(config.dark_theme, "nord");
        assert_eq!(config.default_theme, "gruvbox-light");
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.timings, Timings::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = HighlighterConfig {
            transformers: vec!["notation-diff".to_string()],
            ..HighlighterConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(HighlighterConfig::from_json(&json).unwrap(), config);
    }
}
