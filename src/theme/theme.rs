use super::Color;
use crate::syntax::HighlightKind;

/// Style for a syntax token (color + optional attributes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub fg: Color,
    pub bg: Option<Color>,
    pub bold: bool,
    pub italic: bool,
}

impl Style {
    pub const fn new(fg: Color) -> Self {
        Self {
            fg,
            bg: None,
            bold: false,
            italic: false,
        }
    }

    pub const fn with_bg(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }

    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Inline CSS declarations for this style
    pub fn to_css(&self) -> String {
        let mut css = format!("color:{}", self.fg.to_hex());
        if let Some(bg) = self.bg {
            css.push_str(";background-color:");
            css.push_str(&bg.to_hex());
        }
        if self.bold {
            css.push_str(";font-weight:bold");
        }
        if self.italic {
            css.push_str(";font-style:italic");
        }
        css
    }
}

impl From<Color> for Style {
    fn from(color: Color) -> Self {
        Style::new(color)
    }
}

/// Complete theme definition
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub dark: bool,

    // Block chrome
    pub background: Color,
    pub foreground: Color,

    // Syntax highlighting
    pub syntax_keyword: Style,
    pub syntax_string: Style,
    pub syntax_number: Style,
    pub syntax_comment: Style,
    pub syntax_function: Style,
    pub syntax_type: Style,
    pub syntax_variable: Style,
    pub syntax_operator: Style,
    pub syntax_punctuation: Style,
    pub syntax_property: Style,
    pub syntax_constant: Style,
    pub syntax_namespace: Style,
    pub syntax_label: Style,
}

impl Theme {
    /// Token style for a highlight kind; `None` means inherit the block foreground
    pub fn style_for(&self, kind: HighlightKind) -> Option<Style> {
        match kind {
            HighlightKind::Keyword => Some(self.syntax_keyword),
            HighlightKind::String => Some(self.syntax_string),
            HighlightKind::Number => Some(self.syntax_number),
            HighlightKind::Comment => Some(self.syntax_comment),
            HighlightKind::Function => Some(self.syntax_function),
            HighlightKind::Type => Some(self.syntax_type),
            HighlightKind::Variable | HighlightKind::Parameter => Some(self.syntax_variable),
            HighlightKind::Operator => Some(self.syntax_operator),
            HighlightKind::Punctuation => Some(self.syntax_punctuation),
            HighlightKind::Property => Some(self.syntax_property),
            HighlightKind::Constant => Some(self.syntax_constant),
            HighlightKind::Namespace => Some(self.syntax_namespace),
            HighlightKind::Label => Some(self.syntax_label),
            HighlightKind::Default => None,
        }
    }

    /// Gruvbox Dark - warm retro theme
    pub fn gruvbox_dark() -> Self {
        Self {
            name: "gruvbox-dark".to_string(),
            dark: true,
            background: Color::from_u32(0x282828),
            foreground: Color::from_u32(0xebdbb2),

            syntax_keyword: Style::new(Color::from_u32(0xfb4934)).bold(),
            syntax_string: Style::new(Color::from_u32(0xb8bb26)),
            syntax_number: Style::new(Color::from_u32(0xd3869b)),
            syntax_comment: Style::new(Color::from_u32(0x928374)).italic(),
            syntax_function: Style::new(Color::from_u32(0xfabd2f)),
            syntax_type: Style::new(Color::from_u32(0x83a598)),
            syntax_variable: Color::from_u32(0xebdbb2).into(),
            syntax_operator: Color::from_u32(0xfe8019).into(),
            syntax_punctuation: Color::from_u32(0xa89984).into(),
            syntax_property: Color::from_u32(0x8ec07c).into(),
            syntax_constant: Color::from_u32(0xd3869b).into(),
            syntax_namespace: Color::from_u32(0x83a598).into(),
            syntax_label: Style::new(Color::from_u32(0xfe8019)).italic(),
        }
    }

    /// Gruvbox Light
    pub fn gruvbox_light() -> Self {
        Self {
            name: "gruvbox-light".to_string(),
            dark: false,
            background: Color::from_u32(0xfbf1c7),
            foreground: Color::from_u32(0x3c3836),

            syntax_keyword: Style::new(Color::from_u32(0x9d0006)).bold(),
            syntax_string: Style::new(Color::from_u32(0x79740e)),
            syntax_number: Style::new(Color::from_u32(0x8f3f71)),
            syntax_comment: Style::new(Color::from_u32(0x928374)).italic(),
            syntax_function: Style::new(Color::from_u32(0xb57614)),
            syntax_type: Style::new(Color::from_u32(0x076678)),
            syntax_variable: Color::from_u32(0x3c3836).into(),
            syntax_operator: Color::from_u32(0xd65d0e).into(),
            syntax_punctuation: Color::from_u32(0x3c3836).into(),
            syntax_property: Color::from_u32(0x427b58).into(),
            syntax_constant: Color::from_u32(0x8f3f71).into(),
            syntax_namespace: Color::from_u32(0x076678).into(),
            syntax_label: Style::new(Color::from_u32(0xaf3a03)).italic(),
        }
    }

    /// Nord - arctic, north-bluish color palette
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            dark: true,
            background: Color::from_u32(0x2e3440),
            foreground: Color::from_u32(0xd8dee9),

            syntax_keyword: Style::new(Color::from_u32(0x81a1c1)).bold(),
            syntax_string: Style::new(Color::from_u32(0xa3be8c)),
            syntax_number: Style::new(Color::from_u32(0xb48ead)),
            syntax_comment: Style::new(Color::from_u32(0x616e88)).italic(),
            syntax_function: Style::new(Color::from_u32(0x88c0d0)),
            syntax_type: Style::new(Color::from_u32(0x8fbcbb)),
            syntax_variable: Color::from_u32(0xd8dee9).into(),
            syntax_operator: Color::from_u32(0x81a1c1).into(),
            syntax_punctuation: Color::from_u32(0xeceff4).into(),
            syntax_property: Color::from_u32(0x88c0d0).into(),
            syntax_constant: Color::from_u32(0xb48ead).into(),
            syntax_namespace: Color::from_u32(0x8fbcbb).into(),
            syntax_label: Style::new(Color::from_u32(0xd08770)).italic(),
        }
    }

    /// Dracula - dark theme with vibrant colors
    pub fn dracula() -> Self {
        Self {
            name: "dracula".to_string(),
            dark: true,
            background: Color::from_u32(0x282a36),
            foreground: Color::from_u32(0xf8f8f2),

            syntax_keyword: Style::new(Color::from_u32(0xff79c6)).bold(),
            syntax_string: Style::new(Color::from_u32(0xf1fa8c)),
            syntax_number: Style::new(Color::from_u32(0xbd93f9)),
            syntax_comment: Style::new(Color::from_u32(0x6272a4)).italic(),
            syntax_function: Style::new(Color::from_u32(0x50fa7b)),
            syntax_type: Style::new(Color::from_u32(0x8be9fd)).italic(),
            syntax_variable: Color::from_u32(0xf8f8f2).into(),
            syntax_operator: Color::from_u32(0xff79c6).into(),
            syntax_punctuation: Color::from_u32(0xf8f8f2).into(),
            syntax_property: Color::from_u32(0x66d9ef).into(),
            syntax_constant: Color::from_u32(0xbd93f9).into(),
            syntax_namespace: Color::from_u32(0x8be9fd).into(),
            syntax_label: Style::new(Color::from_u32(0xffb86c)).italic(),
        }
    }

    /// Solarized Dark
    pub fn solarized_dark() -> Self {
        Self {
            name: "solarized-dark".to_string(),
            dark: true,
            background: Color::from_u32(0x002b36),
            foreground: Color::from_u32(0x839496),

            syntax_keyword: Style::new(Color::from_u32(0x859900)).bold(),
            syntax_string: Style::new(Color::from_u32(0x2aa198)),
            syntax_number: Style::new(Color::from_u32(0xd33682)),
            syntax_comment: Style::new(Color::from_u32(0x586e75)).italic(),
            syntax_function: Style::new(Color::from_u32(0x268bd2)),
            syntax_type: Style::new(Color::from_u32(0xb58900)),
            syntax_variable: Color::from_u32(0x839496).into(),
            syntax_operator: Color::from_u32(0x859900).into(),
            syntax_punctuation: Color::from_u32(0x839496).into(),
            syntax_property: Color::from_u32(0x268bd2).into(),
            syntax_constant: Color::from_u32(0xcb4b16).into(),
            syntax_namespace: Color::from_u32(0x6c71c4).into(),
            syntax_label: Style::new(Color::from_u32(0xcb4b16)).italic(),
        }
    }

    /// Solarized Light
    pub fn solarized_light() -> Self {
        Self {
            name: "solarized-light".to_string(),
            dark: false,
            background: Color::from_u32(0xfdf6e3),
            foreground: Color::from_u32(0x657b83),
            ..Self::solarized_dark()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::gruvbox_light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_to_css() {
        let style = Style::new(Color::from_u32(0x112233)).bold().italic();
        assert_eq!(
            style.to_css(),
            "color:#112233;font-weight:bold;font-style:italic"
        );
        let style = Style::new(Color::BLACK).with_bg(Color::WHITE);
        assert_eq!(style.to_css(), "color:#000000;background-color:#ffffff");
    }

    #[test]
    fn test_default_kind_inherits_foreground() {
        let theme = Theme::nord();
        assert!(theme.style_for(HighlightKind::Default).is_none());
        assert_eq!(
            theme.style_for(HighlightKind::Comment),
            Some(theme.syntax_comment)
        );
    }

    #[test]
    fn test_solarized_light_shares_accents() {
        let light = Theme::solarized_light();
        let dark = Theme::solarized_dark();
        assert!(!light.dark);
        assert_eq!(light.syntax_keyword, dark.syntax_keyword);
        assert_ne!(light.background, dark.background);
    }
}
