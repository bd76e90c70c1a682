//! Tree-sitter parse -> per-line highlight spans

use tree_sitter::{Parser, Tree, TreeCursor};

use super::languages::Language;
use crate::error::{Error, Result};

/// A highlight span within a line
#[derive(Debug, Clone)]
pub struct Highlight {
    pub start: usize, // Column start (byte offset within line)
    pub end: usize,   // Column end (byte offset within line)
    pub kind: HighlightKind,
}

/// Types of syntax elements for highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    Keyword,
    String,
    Number,
    Comment,
    Function,
    Type,
    Variable,
    Operator,
    Punctuation,
    Property,
    Constant,
    Namespace,
    Parameter,
    Label,
    Default,
}

const RUST_KEYWORDS: &[&str] = &[
    "let", "fn", "pub", "mod", "use", "struct", "enum", "trait", "impl", "for", "loop", "while",
    "if", "else", "match", "return", "break", "continue", "async", "await", "const", "static",
    "mut", "ref", "self", "super", "crate", "where", "as", "in", "dyn", "move", "type", "unsafe",
    "extern",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "def", "class", "if", "elif", "else", "for", "while", "try", "except", "finally", "with",
    "as", "import", "from", "return", "yield", "raise", "pass", "break", "continue", "lambda",
    "and", "or", "not", "in", "is", "global", "nonlocal", "assert", "async", "await",
];

const JS_KEYWORDS: &[&str] = &[
    "function", "const", "let", "var", "if", "else", "for", "while", "do", "switch", "case",
    "default", "break", "continue", "return", "throw", "try", "catch", "finally", "class",
    "extends", "new", "this", "super", "import", "export", "from", "async", "await", "yield",
    "typeof", "instanceof", "in", "of", "delete", "void", "interface", "type", "enum",
    "implements", "public", "private", "protected", "readonly", "abstract", "static",
];

const GO_KEYWORDS: &[&str] = &[
    "func", "package", "import", "type", "struct", "interface", "map", "chan", "if", "else",
    "for", "range", "switch", "case", "default", "select", "break", "continue", "return", "go",
    "defer", "var", "const", "fallthrough",
];

impl HighlightKind {
    /// Map a Tree-sitter node type to a highlight kind
    pub fn from_node_type(node_type: &str, lang: Language) -> Self {
        match node_type {
            "comment" | "line_comment" | "block_comment" | "doc_comment" => HighlightKind::Comment,

            "string"
            | "string_literal"
            | "raw_string"
            | "raw_string_literal"
            | "char_literal"
            | "string_content"
            | "string_fragment"
            | "template_string"
            | "escape_sequence"
            | "interpreted_string_literal" => HighlightKind::String,

            "number" | "integer" | "float" | "integer_literal" | "float_literal"
            | "number_literal" => HighlightKind::Number,

            "keyword" | "storage_class" | "visibility_modifier" | "mutable_specifier" => {
                HighlightKind::Keyword
            }

            "function_item"
            | "function_definition"
            | "method_definition"
            | "function_declaration"
            | "call_expression"
            | "method_call" => HighlightKind::Function,

            "type"
            | "type_identifier"
            | "primitive_type"
            | "predefined_type"
            | "generic_type"
            | "class_definition" => HighlightKind::Type,

            "identifier" | "variable" | "field_identifier" | "shorthand_field_identifier" => {
                HighlightKind::Variable
            }

            "operator" | "comparison_operator" | "assignment_operator" | "=" | "==" | "!="
            | "+" | "-" | "*" | "/" | "=>" | "->" | "&&" | "||" => HighlightKind::Operator,

            "(" | ")" | "[" | "]" | "{" | "}" | ";" | "," | ":" | "." | "::" => {
                HighlightKind::Punctuation
            }

            "property" | "property_identifier" => HighlightKind::Property,

            "true" | "false" | "null" | "none" | "nil" | "boolean" | "constant" | "undefined" => {
                HighlightKind::Constant
            }

            "namespace" | "module" | "scoped_identifier" => HighlightKind::Namespace,

            "parameter" | "formal_parameter" => HighlightKind::Parameter,

            "label" | "loop_label" | "lifetime" | "attribute_item" | "inner_attribute_item"
            | "decorator" => HighlightKind::Label,

            other => Self::keyword_for(other, lang),
        }
    }

    fn keyword_for(node_type: &str, lang: Language) -> Self {
        let keywords = match lang {
            Language::Rust => RUST_KEYWORDS,
            Language::Python => PYTHON_KEYWORDS,
            Language::JavaScript | Language::TypeScript | Language::Tsx => JS_KEYWORDS,
            Language::Go => GO_KEYWORDS,
            _ => return HighlightKind::Default,
        };
        if keywords.contains(&node_type) {
            HighlightKind::Keyword
        } else if lang == Language::Rust && node_type == "macro_invocation" {
            HighlightKind::Function
        } else {
            HighlightKind::Default
        }
    }
}

/// A line with its syntax highlights
#[derive(Debug, Clone, Default)]
pub struct HighlightedLine {
    pub highlights: Vec<Highlight>,
}

impl HighlightedLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the highlight kind at a given column; outer spans win
    pub fn kind_at(&self, col: usize) -> HighlightKind {
        self.highlights
            .iter()
            .find(|h| col >= h.start && col < h.end)
            .map(|h| h.kind)
            .unwrap_or(HighlightKind::Default)
    }

    /// Split `text` into runs of equal highlight kind
    pub fn runs<'a>(&self, text: &'a str) -> Vec<(&'a str, HighlightKind)> {
        let mut runs = Vec::new();
        let mut run_start = 0;
        let mut run_kind = None;

        for (col, _) in text.char_indices() {
            let kind = self.kind_at(col);
            match run_kind {
                Some(current) if current == kind => {}
                Some(current) => {
                    runs.push((&text[run_start..col], current));
                    run_start = col;
                    run_kind = Some(kind);
                }
                None => run_kind = Some(kind),
            }
        }

        if let Some(kind) = run_kind {
            runs.push((&text[run_start..], kind));
        }
        runs
    }
}

/// Parse `source` with `grammar` and collect highlight spans per line
pub fn highlight_source(
    grammar: &tree_sitter::Language,
    lang: Language,
    source: &str,
) -> Result<Vec<HighlightedLine>> {
    let mut parser = Parser::new();
    parser
        .set_language(grammar)
        .map_err(|e| Error::RenderFailure(format!("incompatible grammar: {}", e)))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| Error::RenderFailure("parser produced no tree".to_string()))?;

    Ok(build_highlights(source, &tree, lang))
}

/// Build highlights from the parse tree
fn build_highlights(source: &str, tree: &Tree, lang: Language) -> Vec<HighlightedLine> {
    let line_count = source.split('\n').count();
    let mut lines = vec![HighlightedLine::new(); line_count];

    let mut line_starts: Vec<usize> = vec![0];
    for (i, c) in source.char_indices() {
        if c == '\n' {
            line_starts.push(i + 1);
        }
    }

    let mut cursor = tree.walk();
    walk_tree(&mut cursor, source, &line_starts, lang, &mut lines);
    lines
}

fn walk_tree(
    cursor: &mut TreeCursor,
    source: &str,
    line_starts: &[usize],
    lang: Language,
    lines: &mut [HighlightedLine],
) {
    loop {
        let node = cursor.node();
        let kind = HighlightKind::from_node_type(node.kind(), lang);

        // Leaves, plus a few parents that read best as one span
        if kind != HighlightKind::Default
            && (node.child_count() == 0 || is_highlightable_parent(node.kind()))
        {
            let start_byte = node.start_byte();
            let end_byte = node.end_byte();
            let start_line = node.start_position().row;
            let end_line = node.end_position().row;

            for line in start_line..=end_line.min(lines.len().saturating_sub(1)) {
                let line_start = line_starts.get(line).copied().unwrap_or(0);
                let line_end = line_starts.get(line + 1).copied().unwrap_or(source.len());

                let start = if line == start_line {
                    start_byte.saturating_sub(line_start)
                } else {
                    0
                };
                let end = if line == end_line {
                    end_byte.saturating_sub(line_start)
                } else {
                    line_end.saturating_sub(line_start)
                };

                if start < end {
                    lines[line].highlights.push(Highlight { start, end, kind });
                }
            }
        }

        if cursor.goto_first_child() {
            walk_tree(cursor, source, line_starts, lang, lines);
            cursor.goto_parent();
        }

        if !cursor.goto_next_sibling() {
            break;
        }
    }
}

/// Check if a parent node type should be highlighted as a whole
fn is_highlightable_parent(node_type: &str) -> bool {
    matches!(
        node_type,
        "string"
            | "string_literal"
            | "raw_string"
            | "raw_string_literal"
            | "template_string"
            | "comment"
            | "line_comment"
            | "block_comment"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(spans: &[(usize, usize, HighlightKind)]) -> HighlightedLine {
        HighlightedLine {
            highlights: spans
                .iter()
                .map(|&(start, end, kind)| Highlight { start, end, kind })
                .collect(),
        }
    }

    #[test]
    fn test_highlight_kind_from_node() {
        assert_eq!(
            HighlightKind::from_node_type("comment", Language::Rust),
            HighlightKind::Comment
        );
        assert_eq!(
            HighlightKind::from_node_type("string", Language::Python),
            HighlightKind::String
        );
        assert_eq!(
            HighlightKind::from_node_type("integer", Language::Go),
            HighlightKind::Number
        );
        assert_eq!(
            HighlightKind::from_node_type("let", Language::JavaScript),
            HighlightKind::Keyword
        );
        assert_eq!(
            HighlightKind::from_node_type("let", Language::Unknown),
            HighlightKind::Default
        );
    }

    #[test]
    fn test_kind_at_prefers_outer_span() {
        let l = line(&[
            (0, 7, HighlightKind::String),
            (1, 6, HighlightKind::Variable),
        ]);
        assert_eq!(l.kind_at(3), HighlightKind::String);
        assert_eq!(l.kind_at(7), HighlightKind::Default);
    }

    #[test]
    fn test_runs_cover_whole_line() {
        let l = line(&[(0, 3, HighlightKind::Keyword), (8, 9, HighlightKind::Number)]);
        let runs = l.runs("let x = 1;");
        assert_eq!(
            runs,
            vec![
                ("let", HighlightKind::Keyword),
                (" x = ", HighlightKind::Default),
                ("1", HighlightKind::Number),
                (";", HighlightKind::Default),
            ]
        );
        let joined: String = runs.iter().map(|(t, _)| *t).collect();
        assert_eq!(joined, "let x = 1;");
    }

    #[test]
    fn test_runs_of_empty_line() {
        assert!(HighlightedLine::new().runs("").is_empty());
    }

    #[test]
    fn test_runs_respect_char_boundaries() {
        let l = line(&[(0, 2, HighlightKind::String)]);
        let runs = l.runs("é!");
        assert_eq!(runs, vec![("é", HighlightKind::String), ("!", HighlightKind::Default)]);
    }
}
