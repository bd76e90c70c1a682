//! Highlight directive annotation
//!
//! Strips directive comments from a code block and records which display
//! lines carry which highlight level. Pure text in, text and map out.

mod directive;

use std::collections::BTreeMap;

pub use directive::{Directive, HighlightLevel, LineToken, parse_ranges, tokenize_line};

/// 1-based display line number -> highlight level
pub type LevelMap = BTreeMap<usize, HighlightLevel>;

/// Result of annotating a block of source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotated {
    /// Source with directive-only lines removed, as shown to the reader
    pub display_text: String,
    /// Highlight level per display line
    pub levels: LevelMap,
}

/// Extract highlight directives from `source`
///
/// Nested `@highlight-start` blocks resolve innermost-first. An
/// `@highlight-end` with nothing open is ignored.
pub fn annotate(source: &str) -> Annotated {
    let raw_line_count = source.split('\n').count();

    let mut display: Vec<std::borrow::Cow<'_, str>> = Vec::with_capacity(raw_line_count);
    let mut levels = LevelMap::new();
    let mut stack: Vec<HighlightLevel> = Vec::new();
    let mut line_offset = 0usize;

    for (raw, line) in source.split('\n').enumerate() {
        let display_line = raw - line_offset + 1;

        match tokenize_line(line, raw == 0) {
            LineToken::Code(text) => {
                if let Some(&top) = stack.last() {
                    levels.insert(display_line, top);
                }
                display.push(text.into());
            }
            LineToken::Directive(directive) => {
                line_offset += 1;
                match directive {
                    Directive::Range(ranges) => {
                        for range in ranges {
                            // Lines past the end of the block can never be shown
                            let end = (*range.end()).min(raw_line_count);
                            for n in *range.start()..=end {
                                levels.insert(n, HighlightLevel::default());
                            }
                        }
                    }
                    Directive::BlockStart(level) => stack.push(level),
                    Directive::BlockEnd => {
                        if stack.pop().is_none() {
                            tracing::debug!(line = raw + 1, "@highlight-end without an open block");
                        }
                    }
                }
            }
            LineToken::Trailing { code, directive } => {
                match directive {
                    Directive::BlockStart(level) => {
                        stack.push(level);
                        levels.insert(display_line, level);
                    }
                    // The closed block still owns the line it trails
                    Directive::BlockEnd => match stack.pop() {
                        Some(level) => {
                            levels.insert(display_line, level);
                        }
                        None => {
                            tracing::debug!(line = raw + 1, "@highlight-end without an open block");
                        }
                    },
                    Directive::Range(_) => {}
                }
                display.push(code);
            }
        }
    }

    if !stack.is_empty() {
        tracing::debug!(open = stack.len(), "highlight blocks left open at end of source");
    }

    Annotated {
        display_text: display.join("\n"),
        levels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(n: u8) -> HighlightLevel {
        HighlightLevel::new(n).unwrap()
    }

    fn map(entries: &[(usize, u8)]) -> LevelMap {
        entries.iter().map(|&(line, l)| (line, level(l))).collect()
    }

    #[test]
    fn test_no_directives_is_identity() {
        for source in ["", "fn main() {}\n", "a\r\nb\r\n", "x\n\n\ny"] {
            let annotated = annotate(source);
            assert_eq!(annotated.display_text, source);
            assert!(annotated.levels.is_empty());
        }
    }

    #[test]
    fn test_range_directive() {
        let source = "// @highlight: 2,4-5\none\ntwo\nthree\nfour\nfive\nsix";
        let annotated = annotate(source);
        assert_eq!(annotated.display_text, "one\ntwo\nthree\nfour\nfive\nsix");
        assert_eq!(annotated.levels, map(&[(2, 1), (4, 1), (5, 1)]));
    }

    #[test]
    fn test_range_directive_with_malformed_tokens() {
        let annotated = annotate("# @highlight: 1, nope, 3-x\na\nb");
        assert_eq!(annotated.display_text, "a\nb");
        assert_eq!(annotated.levels, map(&[(1, 1)]));
    }

    #[test]
    fn test_block_wraps_lines() {
        let source = "before\n// @highlight-start[2]\na\nb\nc\n// @highlight-end\nafter";
        let annotated = annotate(source);
        assert_eq!(annotated.display_text, "before\na\nb\nc\nafter");
        assert_eq!(annotated.levels, map(&[(2, 2), (3, 2), (4, 2)]));
    }

    #[test]
    fn test_nested_blocks_innermost_wins() {
        let source = "// @highlight-start[1]\n// @highlight-start[3]\nX\n// @highlight-end\nY\n// @highlight-end";
        let annotated = annotate(source);
        assert_eq!(annotated.display_text, "X\nY");
        assert_eq!(annotated.levels, map(&[(1, 3), (2, 1)]));
    }

    #[test]
    fn test_javascript_scenario() {
        let annotated = annotate("// @highlight-start[2]\nlet x = 1;\n// @highlight-end\nlet y = 2;");
        assert_eq!(annotated.display_text, "let x = 1;\nlet y = 2;");
        assert_eq!(annotated.levels, map(&[(1, 2)]));
    }

    #[test]
    fn test_trailing_start_applies_to_its_own_line() {
        let source = "a\nb // @highlight-start[3]\nc\nd // @highlight-end\ne";
        let annotated = annotate(source);
        assert_eq!(annotated.display_text, "a\nb\nc\nd\ne");
        assert_eq!(annotated.levels, map(&[(2, 3), (3, 3), (4, 3)]));
    }

    #[test]
    fn test_trailing_end_attaches_to_closed_line() {
        let source = "// @highlight-start[1]\n// @highlight-start[4]\ninner(); // @highlight-end\nouter();\n// @highlight-end";
        let annotated = annotate(source);
        assert_eq!(annotated.display_text, "inner();\nouter();");
        assert_eq!(annotated.levels, map(&[(1, 4), (2, 1)]));
    }

    #[test]
    fn test_underflow_is_noop() {
        let source = "a\n// @highlight-end\nb\nc // @highlight-end";
        let annotated = annotate(source);
        assert_eq!(annotated.display_text, "a\nb\nc");
        assert!(annotated.levels.is_empty());
    }

    #[test]
    fn test_unclosed_block_runs_to_end() {
        let annotated = annotate("a\n# @highlight-start\nb\nc");
        assert_eq!(annotated.display_text, "a\nb\nc");
        assert_eq!(annotated.levels, map(&[(2, 1), (3, 1)]));
    }

    #[test]
    fn test_blocks_override_ranges() {
        let source = "// @highlight: 1-2\n// @highlight-start[2]\na\n// @highlight-end\nb";
        let annotated = annotate(source);
        assert_eq!(annotated.display_text, "a\nb");
        assert_eq!(annotated.levels, map(&[(1, 2), (2, 1)]));
    }

    #[test]
    fn test_huge_range_is_bounded() {
        let annotated = annotate("// @highlight: 1-4000000000\na\nb");
        assert_eq!(annotated.levels.len(), 3);
    }

    #[test]
    fn test_annotate_is_deterministic() {
        let source = "// @highlight: 3\n// @highlight-start[2]\nx\n// @highlight-end\ny\nz";
        assert_eq!(annotate(source), annotate(source));
    }
}
