//! Line tokenizer for highlight directives
//!
//! Directives live inside comments so the source stays valid in its own
//! language:
//!
//! ```text
//! // @highlight: 2,4-5            first line only
//! // @highlight-start[2]          opens a level-2 block
//! let x = 1; // @highlight-end    closes it, `let x = 1;` keeps level 2
//! ```

use std::borrow::Cow;
use std::ops::RangeInclusive;

/// Comment openers with their closers, longest-first where they overlap
const COMMENT_FORMS: &[(&str, &str)] = &[
    ("<!--", "-->"),
    ("/*", "*/"),
    ("//", ""),
    ("--", ""),
    ("#", ""),
    (";", ""),
];

const START: &str = "@highlight-start";
const END: &str = "@highlight-end";
const RANGES: &str = "@highlight";

/// Emphasis level of a display line, always within 1..=4
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HighlightLevel(u8);

impl HighlightLevel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    /// Exact constructor, `None` outside 1..=4
    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    /// Clamp an arbitrary requested level into range
    pub fn clamped(level: u64) -> Self {
        Self(level.clamp(Self::MIN as u64, Self::MAX as u64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for HighlightLevel {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

/// A parsed directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `@highlight: 1,3-4` - 1-based display lines, first line only
    Range(Vec<RangeInclusive<usize>>),
    /// `@highlight-start[level]`
    BlockStart(HighlightLevel),
    /// `@highlight-end`
    BlockEnd,
}

/// Classification of one source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineToken<'a> {
    /// Ordinary code, kept verbatim
    Code(&'a str),
    /// A directive occupying the whole line; the line is dropped
    Directive(Directive),
    /// Code sharing its line with a block directive; the code is kept
    Trailing {
        code: Cow<'a, str>,
        directive: Directive,
    },
}

/// Classify a single line. `first` enables the range form.
///
/// Every `@highlight` on the line is tried in order; the first one that
/// follows a comment opener and parses wins.
pub fn tokenize_line(line: &str, first: bool) -> LineToken<'_> {
    let body = line.trim_end_matches('\r');

    body.match_indices(RANGES)
        .find_map(|(at, _)| directive_at(line, body, at, first))
        .unwrap_or(LineToken::Code(line))
}

/// The directive starting at byte `at` of `body`, if it is one
fn directive_at<'a>(line: &'a str, body: &'a str, at: usize, first: bool) -> Option<LineToken<'a>> {
    let (code, closer) = split_comment_opener(&body[..at])?;
    let (directive, tail) = parse_directive(&body[at..], closer)?;

    let code_blank = code.trim().is_empty();
    let tail = tail.trim();

    match (&directive, code_blank, tail.is_empty()) {
        (Directive::Range(_), true, true) if first => Some(LineToken::Directive(directive)),
        (Directive::Range(_), _, _) => Some(LineToken::Code(line)),
        (_, true, true) => Some(LineToken::Directive(directive)),
        (_, false, true) => Some(LineToken::Trailing {
            code: Cow::Borrowed(code.trim_end()),
            directive,
        }),
        // `/* @highlight-end */ foo();` - leading block comment, code after it
        (_, true, false) if !closer.is_empty() => Some(LineToken::Trailing {
            code: leading_remainder(code, tail),
            directive,
        }),
        _ => None,
    }
}

/// Split the text before a directive into (code, closer) if it ends with a
/// comment opener
fn split_comment_opener(before: &str) -> Option<(&str, &'static str)> {
    let trimmed = before.trim_end();
    COMMENT_FORMS.iter().find_map(|(open, close)| {
        trimmed
            .strip_suffix(open)
            .map(|code| (code, *close))
    })
}

/// Parse the directive at the start of `text`, returning it with whatever
/// follows the directive and its comment closer
fn parse_directive<'a>(text: &'a str, closer: &str) -> Option<(Directive, &'a str)> {
    let (directive, rest) = if let Some(rest) = text.strip_prefix(START) {
        let (level, rest) = parse_level(rest)?;
        (Directive::BlockStart(level), rest)
    } else if let Some(rest) = text.strip_prefix(END) {
        (Directive::BlockEnd, rest)
    } else {
        let rest = text.strip_prefix(RANGES)?.trim_start().strip_prefix(':')?;
        let (spec, after) = match closer {
            "" => (rest, ""),
            close => rest.split_once(close).unwrap_or((rest, "")),
        };
        return Some((Directive::Range(parse_ranges(spec)), after));
    };

    // `@highlight-endfoo` is not a directive
    if rest.starts_with(|c: char| c.is_alphanumeric() || c == '-' || c == '_') {
        return None;
    }

    let rest = rest.trim_start();
    let rest = if closer.is_empty() {
        rest
    } else {
        rest.strip_prefix(closer).unwrap_or(rest)
    };
    Some((directive, rest))
}

/// `[2]` -> level 2, nothing -> level 1, `[x]` -> level 1, unclosed -> not a directive
fn parse_level(rest: &str) -> Option<(HighlightLevel, &str)> {
    let Some(inner) = rest.strip_prefix('[') else {
        return Some((HighlightLevel::default(), rest));
    };
    let (level, rest) = inner.split_once(']')?;
    let level = level
        .trim()
        .parse::<u64>()
        .map(HighlightLevel::clamped)
        .unwrap_or_default();
    Some((level, rest))
}

/// Parse `1,3-5, 8` into inclusive 1-based ranges, dropping malformed tokens
pub fn parse_ranges(spec: &str) -> Vec<RangeInclusive<usize>> {
    spec.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.split_once('-') {
            Some((start, end)) => {
                let start = start.trim().parse::<usize>().ok()?;
                let end = end.trim().parse::<usize>().ok()?;
                (start >= 1 && start <= end).then_some(start..=end)
            }
            None => {
                let line = token.parse::<usize>().ok()?;
                (line >= 1).then_some(line..=line)
            }
        })
        .collect()
}

/// Code that follows a leading block-comment directive, keeping indentation
fn leading_remainder<'a>(indent: &'a str, tail: &'a str) -> Cow<'a, str> {
    if indent.is_empty() {
        Cow::Borrowed(tail)
    } else {
        Cow::Owned(format!("{indent}{tail}"))
    }
}
