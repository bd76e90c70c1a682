mod colors;
mod theme;

pub use colors::Color;
pub use theme::{Style, Theme};

/// Theme used when a config names none
pub fn default_theme() -> Theme {
    Theme::gruvbox_light()
}

pub fn list_builtin_themes() -> Vec<&'static str> {
    vec![
        "gruvbox-dark",
        "gruvbox-light",
        "nord",
        "dracula",
        "solarized-dark",
        "solarized-light",
    ]
}

pub fn get_builtin_theme(name: &str) -> Option<Theme> {
    match name {
        "gruvbox-dark" => Some(Theme::gruvbox_dark()),
        "gruvbox-light" => Some(Theme::gruvbox_light()),
        "nord" => Some(Theme::nord()),
        "dracula" => Some(Theme::dracula()),
        "solarized-dark" => Some(Theme::solarized_dark()),
        "solarized-light" => Some(Theme::solarized_light()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_theme_resolves_under_its_own_name() {
        for name in list_builtin_themes() {
            let theme = get_builtin_theme(name).unwrap();
            assert_eq!(theme.name, name);
        }
        assert!(get_builtin_theme("nope").is_none());
        assert!(!default_theme().dark);
    }
}
