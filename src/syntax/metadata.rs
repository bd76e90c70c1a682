//! Grammar metadata tracking for ABI version compatibility
//!
//! Grammar directories may carry a `metadata.json` recording which
//! Tree-sitter ABI each grammar was compiled with. Grammars built for a
//! different ABI are skipped instead of loaded.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Current tree-sitter ABI version
/// This should match the tree-sitter crate version
pub const TREE_SITTER_ABI_VERSION: u32 = 14; // tree-sitter 0.24.x uses ABI 14

pub const METADATA_FILE: &str = "metadata.json";

/// Metadata for a single installed grammar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarInfo {
    /// ABI version the grammar was compiled with
    pub abi_version: u32,
    /// When the grammar was installed
    #[serde(default)]
    pub installed_at: Option<String>,
    /// Git commit hash (if available)
    #[serde(default)]
    pub commit: Option<String>,
}

/// Metadata store for all installed grammars
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GrammarMetadata {
    /// Map of grammar name to info
    pub grammars: HashMap<String, GrammarInfo>,
}

impl GrammarMetadata {
    /// Load `metadata.json` from a grammar directory; absent or unreadable
    /// metadata means nothing is known to be outdated
    pub fn load_from(dir: &Path) -> Self {
        let path = dir.join(METADATA_FILE);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::warn!(path = %path.display(), "ignoring malformed grammar metadata: {}", e);
                Self::default()
            }
        }
    }

    /// Check if a grammar was recorded with a different ABI
    pub fn is_outdated(&self, name: &str) -> bool {
        self.grammars
            .get(name)
            .is_some_and(|info| info.abi_version != TREE_SITTER_ABI_VERSION)
    }

    /// Get list of grammars built for another ABI
    pub fn outdated_grammars(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .grammars
            .iter()
            .filter(|(_, info)| info.abi_version != TREE_SITTER_ABI_VERSION)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}
