//! Notation transformers: optional post-processing passes over rendered
//! fragments
//!
//! A line ending in a marker comment such as `// [!code ++]` loses the
//! marker and gains classes instead:
//!
//! | transformer            | markers                        | line classes            |
//! |------------------------|--------------------------------|-------------------------|
//! | `notation-diff`        | `++`, `--`                     | `diff add`/`diff remove`|
//! | `notation-focus`       | `focus`                        | `focused`               |
//! | `notation-highlight`   | `highlight`, `hl`              | `highlighted`           |
//! | `notation-error-level` | `error`, `warning`             | `highlighted error` ... |

use std::sync::Arc;

use super::markup::{Fragment, RenderedLine};

/// A post-processing pass over a rendered fragment
pub trait Transformer: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, fragment: &mut Fragment);
}

/// Marker name -> classes added to the line
type MarkerTable = &'static [(&'static str, &'static [&'static str])];

/// A transformer driven by `[!code <marker>]` comments
pub struct NotationTransformer {
    name: &'static str,
    markers: MarkerTable,
    /// Class added to the `<pre>` when any marker matched
    block_class: &'static str,
}

impl NotationTransformer {
    pub const fn diff() -> Self {
        Self {
            name: "notation-diff",
            markers: &[("++", &["diff", "add"]), ("--", &["diff", "remove"])],
            block_class: "has-diff",
        }
    }

    pub const fn focus() -> Self {
        Self {
            name: "notation-focus",
            markers: &[("focus", &["focused"])],
            block_class: "has-focused",
        }
    }

    pub const fn highlight() -> Self {
        Self {
            name: "notation-highlight",
            markers: &[("highlight", &["highlighted"]), ("hl", &["highlighted"])],
            block_class: "has-highlighted",
        }
    }

    pub const fn error_level() -> Self {
        Self {
            name: "notation-error-level",
            markers: &[
                ("error", &["highlighted", "error"]),
                ("warning", &["highlighted", "warning"]),
            ],
            block_class: "has-highlighted",
        }
    }

    fn classes_for(&self, marker: &str) -> Option<&'static [&'static str]> {
        self.markers
            .iter()
            .find(|(name, _)| *name == marker)
            .map(|(_, classes)| *classes)
    }

    /// Strip this transformer's markers from a line, returning the classes
    /// they asked for
    fn take_markers(&self, line: &mut RenderedLine) -> Vec<&'static str> {
        let mut classes = Vec::new();

        for token in line.tokens.iter_mut() {
            let mut search_from = 0;
            while let Some(found) = token.text[search_from..].find("[!code ") {
                let start = search_from + found;
                let Some(len) = token.text[start..].find(']') else {
                    break;
                };
                let marker = token.text[start + "[!code ".len()..start + len].trim();
                match self.classes_for(marker) {
                    Some(extra) => {
                        classes.extend_from_slice(extra);
                        token.text.replace_range(start..start + len + 1, "");
                        search_from = start;
                    }
                    // Another transformer's marker
                    None => search_from = start + len + 1,
                }
            }
        }

        if !classes.is_empty() {
            tidy_line_end(line);
        }
        classes
    }
}

impl Transformer for NotationTransformer {
    fn name(&self) -> &'static str {
        self.name
    }

    fn apply(&self, fragment: &mut Fragment) {
        let mut matched = false;
        for line in fragment.lines.iter_mut() {
            for class in self.take_markers(line) {
                line.add_class(class);
                matched = true;
            }
        }
        if matched {
            fragment.add_class(self.block_class);
        }
    }
}

/// Drop the comment shell a removed marker leaves behind
fn tidy_line_end(line: &mut RenderedLine) {
    line.tokens.retain(|t| !t.text.is_empty());

    let Some(last) = line.tokens.last_mut() else {
        return;
    };
    let tidied = strip_empty_comment(&last.text);
    if !tidied.is_empty() {
        last.text = tidied;
        return;
    }

    // The marker had a comment token to itself
    line.tokens.pop();
    if let Some(prev) = line.tokens.last_mut() {
        let len = prev.text.trim_end().len();
        prev.text.truncate(len);
    }
}

fn strip_empty_comment(text: &str) -> String {
    let trimmed = text.trim_end();
    for (open, close) in [("/*", "*/"), ("<!--", "-->")] {
        if let Some(inner) = trimmed.strip_suffix(close) {
            if let Some(code) = inner.trim_end().strip_suffix(open) {
                return code.trim_end().to_string();
            }
        }
    }
    for open in ["//", "#", "--", ";"] {
        if let Some(code) = trimmed.strip_suffix(open) {
            // `a--` is code, `a --` is an emptied comment
            if code.is_empty() || code.ends_with(char::is_whitespace) {
                return code.trim_end().to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Every transformer this build ships
pub fn builtin(name: &str) -> Option<Arc<dyn Transformer>> {
    let transformer: Arc<dyn Transformer> = match name {
        "notation-diff" => Arc::new(NotationTransformer::diff()),
        "notation-focus" => Arc::new(NotationTransformer::focus()),
        "notation-highlight" => Arc::new(NotationTransformer::highlight()),
        "notation-error-level" => Arc::new(NotationTransformer::error_level()),
        _ => return None,
    };
    Some(transformer)
}

/// Resolve configured transformer names; unknown names are skipped
pub fn resolve(names: &[String]) -> Vec<Arc<dyn Transformer>> {
    names
        .iter()
        .filter_map(|name| {
            let transformer = builtin(name);
            if transformer.is_none() {
                tracing::debug!(transformer = %name, "transformer not available, skipping");
            }
            transformer
        })
        .collect()
}
