//! Rendered markup: one element per source line
//!
//! Keeping lines discrete lets later passes (highlight levels, notation
//! transformers) add classes by position without re-parsing HTML.

use crate::theme::{Color, Style, Theme};

/// A styled run of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// `None` inherits the block foreground
    pub style: Option<Style>,
}

impl Token {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn styled(text: impl Into<String>, style: Option<Style>) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// One display line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedLine {
    pub tokens: Vec<Token>,
    pub classes: Vec<String>,
}

impl RenderedLine {
    pub fn plain(text: &str) -> Self {
        let tokens = if text.is_empty() {
            Vec::new()
        } else {
            vec![Token::plain(text)]
        };
        Self {
            tokens,
            classes: Vec::new(),
        }
    }

    /// The line's text without markup
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Engine output for one block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub theme: String,
    pub language: String,
    pub background: Color,
    pub foreground: Color,
    /// Extra classes for the `<pre>` element
    pub classes: Vec<String>,
    pub lines: Vec<RenderedLine>,
}

impl Fragment {
    /// An empty fragment carrying the theme's chrome
    pub fn new(theme: &Theme, language: &str) -> Self {
        Self {
            theme: theme.name.clone(),
            language: language.to_string(),
            background: theme.background,
            foreground: theme.foreground,
            classes: Vec::new(),
            lines: Vec::new(),
        }
    }

    /// Unstyled rendering, one token per line
    pub fn plain(theme: &Theme, language: &str, code: &str) -> Self {
        let mut fragment = Self::new(theme, language);
        fragment.lines = code.split('\n').map(RenderedLine::plain).collect();
        fragment
    }

    /// Add a class to the line at `index` (0-based); false if out of range
    pub fn add_line_class(&mut self, index: usize, class: &str) -> bool {
        match self.lines.get_mut(index) {
            Some(line) => {
                line.add_class(class);
                true
            }
            None => false,
        }
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    /// The fragment's text without markup
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(RenderedLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(64 + self.lines.len() * 48);

        html.push_str("<pre class=\"glint ");
        html.push_str(&escape_html(&self.theme));
        for class in &self.classes {
            html.push(' ');
            html.push_str(&escape_html(class));
        }
        html.push_str(&format!(
            "\" style=\"background-color:{};color:{}\" tabindex=\"0\" data-language=\"{}\"><code>",
            self.background.to_hex(),
            self.foreground.to_hex(),
            escape_html(&self.language)
        ));

        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                html.push('\n');
            }
            html.push_str("<span class=\"line");
            for class in &line.classes {
                html.push(' ');
                html.push_str(&escape_html(class));
            }
            html.push_str("\">");
            for token in &line.tokens {
                match token.style {
                    Some(style) => {
                        html.push_str("<span style=\"");
                        html.push_str(&style.to_css());
                        html.push_str("\">");
                        html.push_str(&escape_html(&token.text));
                        html.push_str("</span>");
                    }
                    None => html.push_str(&escape_html(&token.text)),
                }
            }
            html.push_str("</span>");
        }

        html.push_str("</code></pre>");
        html
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
