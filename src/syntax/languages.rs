//! Language tags and the Tree-sitter grammar registry
//!
//! Grammars are compiled shared libraries loaded from the configured engine
//! source directory (`lib<name>.so` exporting `tree_sitter_<name>`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};

use super::metadata::GrammarMetadata;
use crate::config::FALLBACK_LANGUAGE;
use crate::error::{Error, Result};

/// Languages with dedicated keyword tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Rust,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Go,
    C,
    Cpp,
    Json,
    Toml,
    Markdown,
    Bash,
    Lua,
    Ruby,
    Html,
    Css,
    Yaml,
    Unknown,
}

impl Language {
    /// Resolve a code fence tag (`rs`, `javascript`, `c++`, ...)
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "rust" | "rs" => Language::Rust,
            "python" | "py" | "pyw" | "pyi" => Language::Python,
            "javascript" | "js" | "mjs" | "cjs" | "jsx" => Language::JavaScript,
            "typescript" | "ts" | "mts" | "cts" => Language::TypeScript,
            "tsx" => Language::Tsx,
            "go" | "golang" => Language::Go,
            "c" | "h" => Language::C,
            "cpp" | "c++" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => Language::Cpp,
            "json" => Language::Json,
            "toml" => Language::Toml,
            "markdown" | "md" => Language::Markdown,
            "bash" | "sh" | "shell" | "zsh" => Language::Bash,
            "lua" => Language::Lua,
            "ruby" | "rb" => Language::Ruby,
            "html" | "htm" => Language::Html,
            "css" | "scss" => Language::Css,
            "yaml" | "yml" => Language::Yaml,
            _ => Language::Unknown,
        }
    }

    /// Get the display name for this language
    pub fn name(&self) -> &'static str {
        match self {
            Language::Rust => "Rust",
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::TypeScript => "TypeScript",
            Language::Tsx => "TSX",
            Language::Go => "Go",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Json => "JSON",
            Language::Toml => "TOML",
            Language::Markdown => "Markdown",
            Language::Bash => "Bash",
            Language::Lua => "Lua",
            Language::Ruby => "Ruby",
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Yaml => "YAML",
            Language::Unknown => "Plain Text",
        }
    }

    /// Get the grammar name (used for library loading)
    pub fn grammar_name(&self) -> Option<&'static str> {
        match self {
            Language::Rust => Some("rust"),
            Language::Python => Some("python"),
            Language::JavaScript => Some("javascript"),
            Language::TypeScript => Some("typescript"),
            Language::Tsx => Some("tsx"),
            Language::Go => Some("go"),
            Language::C => Some("c"),
            Language::Cpp => Some("cpp"),
            Language::Json => Some("json"),
            Language::Toml => Some("toml"),
            Language::Markdown => Some("markdown"),
            Language::Bash => Some("bash"),
            Language::Lua => Some("lua"),
            Language::Ruby => Some("ruby"),
            Language::Html => Some("html"),
            Language::Css => Some("css"),
            Language::Yaml => Some("yaml"),
            Language::Unknown => None,
        }
    }
}

/// Normalize a fence tag to the name used by the allow-list and registry
///
/// Known aliases map to their grammar name, plain-text aliases map to
/// `text`, anything else is lowercased as-is.
pub fn canonical_tag(tag: &str) -> String {
    let tag = tag.trim();
    if let Some(name) = Language::from_tag(tag).grammar_name() {
        return name.to_string();
    }
    match tag.to_lowercase().as_str() {
        "" | "txt" | "plain" | "plaintext" | "text" => FALLBACK_LANGUAGE.to_string(),
        other => other.to_string(),
    }
}

/// A loaded grammar library
struct LoadedGrammar {
    // Keeps the code behind `language` mapped
    #[allow(dead_code)]
    library: Library,
    language: tree_sitter::Language,
}

/// Registry of Tree-sitter grammars loaded from one directory
pub struct LanguageRegistry {
    grammars_dir: PathBuf,
    loaded: HashMap<String, LoadedGrammar>,
    metadata: GrammarMetadata,
}

impl LanguageRegistry {
    /// Open a grammar directory; nothing is loaded yet
    pub fn open(grammars_dir: impl Into<PathBuf>) -> Self {
        let grammars_dir = grammars_dir.into();
        let metadata = GrammarMetadata::load_from(&grammars_dir);
        Self {
            grammars_dir,
            loaded: HashMap::new(),
            metadata,
        }
    }

    /// Get the grammars directory path
    pub fn grammars_dir(&self) -> &Path {
        &self.grammars_dir
    }

    /// Check if a grammar library is present
    pub fn is_installed(&self, name: &str) -> bool {
        self.library_path(name).exists()
    }

    /// Get the library path for a grammar
    pub fn library_path(&self, name: &str) -> PathBuf {
        #[cfg(target_os = "macos")]
        let ext = "dylib";
        #[cfg(target_os = "windows")]
        let ext = "dll";
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let ext = "so";

        self.grammars_dir.join(format!("lib{}.{}", name, ext))
    }

    /// Load a grammar library, refusing ones built for another ABI
    pub fn load(&mut self, name: &str) -> Result<()> {
        if self.loaded.contains_key(name) {
            return Ok(());
        }

        let lib_path = self.library_path(name);
        if !lib_path.exists() {
            return Err(Error::EngineUnavailable(format!(
                "grammar `{}` not found at {}",
                name,
                lib_path.display()
            )));
        }

        if self.metadata.is_outdated(name) {
            return Err(Error::EngineUnavailable(format!(
                "grammar `{}` was built for an outdated Tree-sitter ABI",
                name
            )));
        }

        let library = unsafe { Library::new(&lib_path) }
            .map_err(|e| Error::EngineUnavailable(format!("failed to open {}: {}", name, e)))?;

        let func_name = format!("tree_sitter_{}", name.replace('-', "_"));
        let language = unsafe {
            let func: Symbol<unsafe extern "C" fn() -> tree_sitter::Language> = library
                .get(func_name.as_bytes())
                .map_err(|e| Error::EngineUnavailable(format!("{}: {}", func_name, e)))?;
            func()
        };

        self.loaded
            .insert(name.to_string(), LoadedGrammar { library, language });
        Ok(())
    }

    /// A previously loaded grammar
    pub fn get(&self, name: &str) -> Option<&tree_sitter::Language> {
        self.loaded.get(name).map(|g| &g.language)
    }

    /// Grammars the directory's metadata records for another ABI
    pub fn outdated(&self) -> Vec<String> {
        self.metadata.outdated_grammars()
    }

    /// Names of every loaded grammar, sorted
    pub fn loaded_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loaded.keys().cloned().collect();
        names.sort();
        names
    }
}
