use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use rhai::{AST, Engine, Scope};

use super::HighlighterConfig;
use crate::error::{Error, Result};
use crate::syntax::canonical_tag;

/// The Rhai scripting engine for configuration
///
/// ```rhai
/// set_default_theme("gruvbox-light");
/// set_dark_theme("nord");
/// allow_language("haskell");
/// use_transformer("notation-diff");
/// ```
pub struct ConfigEngine {
    engine: Engine,
    config: Arc<RwLock<HighlighterConfig>>,
    ast: Option<AST>,
}

impl ConfigEngine {
    pub fn new() -> Self {
        let config = Arc::new(RwLock::new(HighlighterConfig::default()));
        let engine = Self::create_engine(Arc::clone(&config));

        Self {
            engine,
            config,
            ast: None,
        }
    }

    fn create_engine(config: Arc<RwLock<HighlighterConfig>>) -> Engine {
        let mut engine = Engine::new();

        // Limit script execution for safety
        engine.set_max_expr_depths(64, 64);
        engine.set_max_operations(100_000);

        {
            let c = Arc::clone(&config);
            engine.register_fn("set_default_theme", move |name: &str| {
                if let Ok(mut config) = c.write() {
                    config.default_theme = name.to_string();
                }
            });
        }

        {
            let c = Arc::clone(&config);
            engine.register_fn("set_dark_theme", move |name: &str| {
                if let Ok(mut config) = c.write() {
                    config.dark_theme = name.to_string();
                }
            });
        }

        {
            let c = Arc::clone(&config);
            engine.register_fn("get_default_theme", move || -> String {
                c.read().map(|c| c.default_theme.clone()).unwrap_or_default()
            });
        }

        {
            let c = Arc::clone(&config);
            engine.register_fn("allow_language", move |name: &str| {
                if let Ok(mut config) = c.write() {
                    let name = canonical_tag(name);
                    if !config.languages.contains(&name) {
                        config.languages.push(name);
                    }
                }
            });
        }

        {
            let c = Arc::clone(&config);
            engine.register_fn("clear_languages", move || {
                if let Ok(mut config) = c.write() {
                    config.languages.clear();
                }
            });
        }

        {
            let c = Arc::clone(&config);
            engine.register_fn("preload_theme", move |name: &str| {
                if let Ok(mut config) = c.write() {
                    config.preload_themes.push(name.to_string());
                }
            });
        }

        {
            let c = Arc::clone(&config);
            engine.register_fn("set_engine_source", move |path: &str| {
                if let Ok(mut config) = c.write() {
                    config.engine_source = PathBuf::from(path);
                }
            });
        }

        {
            let c = Arc::clone(&config);
            engine.register_fn("use_transformer", move |name: &str| {
                if let Ok(mut config) = c.write() {
                    config.transformers.push(name.to_string());
                }
            });
        }

        {
            let c = Arc::clone(&config);
            engine.register_fn("exclude_class", move |class: &str| {
                if let Ok(mut config) = c.write() {
                    config.exclusion_markers.push(class.to_string());
                }
            });
        }

        {
            let c = Arc::clone(&config);
            engine.register_fn("dark_indicator", move |token: &str| {
                if let Ok(mut config) = c.write() {
                    config.dark_indicators.push(token.to_string());
                }
            });
        }

        {
            let c = Arc::clone(&config);
            engine.register_fn("set_batch_size", move |size: i64| {
                if let Ok(mut config) = c.write() {
                    config.batch_size = size.clamp(1, 64) as usize;
                }
            });
        }

        engine.on_print(|msg| {
            tracing::info!(target: "glint::config", "{}", msg);
        });

        engine
    }

    /// Load and execute a config file
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;

        self.eval(&content)
    }

    /// Evaluate a Rhai script string
    pub fn eval(&mut self, script: &str) -> Result<()> {
        let ast = self
            .engine
            .compile(script)
            .map_err(|e| Error::Config(format!("parse error: {}", e)))?;

        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| Error::Config(e.to_string()))?;

        self.ast = Some(ast);
        Ok(())
    }

    /// Snapshot of the configuration built so far
    pub fn config(&self) -> HighlighterConfig {
        self.config.read().map(|c| c.clone()).unwrap_or_default()
    }

    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("glint"))
    }

    /// Get the default config file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("init.rhai"))
    }

    /// Load the default config file if it exists
    pub fn load_default(&mut self) -> Result<()> {
        if let Some(config_file) = Self::config_file() {
            if config_file.exists() {
                return self.load_file(&config_file);
            }
        }
        Ok(()) // No config file is fine
    }
}

impl Default for ConfigEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_themes() {
        let mut engine = ConfigEngine::new();
        engine
            .eval(r#"set_default_theme("nord"); set_dark_theme("dracula");"#)
            .unwrap();
        let config = engine.config();
        assert_eq!(config.default_theme, "nord");
        assert_eq!(config.dark_theme, "dracula");
    }

    #[test]
    fn test_allow_language_dedups_and_lowercases() {
        let mut engine = ConfigEngine::new();
        engine
            .eval(r#"clear_languages(); allow_language("Rust"); allow_language("rust");"#)
            .unwrap();
        assert_eq!(engine.config().languages, vec!["rust"]);
    }

    #[test]
    fn test_allow_language_stores_canonical_tags() {
        let mut engine = ConfigEngine::new();
        engine
            .eval(r#"clear_languages(); allow_language("js"); allow_language("JavaScript"); allow_language("sh");"#)
            .unwrap();
        let config = engine.config();
        assert_eq!(config.languages, vec!["javascript", "bash"]);
        assert!(config.is_language_allowed("javascript"));
    }

    #[test]
    fn test_set_batch_size_clamped() {
        let mut engine = ConfigEngine::new();
        engine.eval("set_batch_size(0);").unwrap();
        assert_eq!(engine.config().batch_size, 1);
        engine.eval("set_batch_size(1000);").unwrap();
        assert_eq!(engine.config().batch_size, 64);
    }

    #[test]
    fn test_multiple_settings() {
        let mut engine = ConfigEngine::new();
        engine
            .eval(
                r#"
                set_engine_source("/opt/grammars");
                preload_theme("solarized-dark");
                use_transformer("notation-diff");
                exclude_class("console");
                dark_indicator("midnight");
                let theme = get_default_theme();
                print(theme);
            "#,
            )
            .unwrap();

        let config = engine.config();
        assert_eq!(config.engine_source, PathBuf::from("/opt/grammars"));
        assert_eq!(config.preload_themes, vec!["solarized-dark"]);
        assert_eq!(config.transformers, vec!["notation-diff"]);
        assert!(config.exclusion_markers.contains(&"console".to_string()));
        assert!(config.dark_indicators.contains(&"midnight".to_string()));
    }

    #[test]
    fn test_script_errors_are_reported() {
        let mut engine = ConfigEngine::new();
        assert!(matches!(engine.eval("set_dark_theme("), Err(Error::Config(_))));
        assert!(matches!(engine.eval("no_such_fn();"), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("init.rhai");
        std::fs::write(&path, r#"set_dark_theme("nord");"#).unwrap();

        let mut engine = ConfigEngine::new();
        engine.load_file(&path).unwrap();
        assert_eq!(engine.config().dark_theme, "nord");

        let missing = dir.path().join("missing.rhai");
        assert!(matches!(engine.load_file(&missing), Err(Error::Read { .. })));
    }
}
