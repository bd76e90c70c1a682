//! Static assets written next to the generated pages

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::HighlighterConfig;
use crate::error::{Error, Result};
use crate::page::{COPY_CLASS, LOADING_CLASS, RENDERED_CLASS};

pub const STYLESHEET_FILE: &str = "glint.css";
pub const CONFIG_FILE: &str = "glint-config.json";

/// Background tint and accent bar per highlight level, light then dark
const LEVEL_TINTS: [(&str, &str); 4] = [
    ("rgba(250, 189, 47, 0.18)", "rgba(250, 189, 47, 0.14)"),
    ("rgba(131, 165, 152, 0.22)", "rgba(131, 165, 152, 0.18)"),
    ("rgba(211, 134, 155, 0.22)", "rgba(211, 134, 155, 0.18)"),
    ("rgba(251, 73, 52, 0.20)", "rgba(251, 73, 52, 0.18)"),
];
const LEVEL_ACCENTS: [(&str, &str); 4] = [
    ("#d79921", "#fabd2f"),
    ("#458588", "#83a598"),
    ("#b16286", "#d3869b"),
    ("#cc241d", "#fb4934"),
];

/// Selectors that put the page in dark mode
fn dark_roots(config: &HighlighterConfig) -> Vec<String> {
    config
        .dark_indicators
        .iter()
        .flat_map(|d| [format!("html.{}", d), format!("html[data-theme=\"{}\"]", d)])
        .collect()
}

fn level_rules(out: &mut String, prefix: &str, dark: bool) {
    for level in 1..=4 {
        let (tint, accent) = if dark {
            (LEVEL_TINTS[level - 1].1, LEVEL_ACCENTS[level - 1].1)
        } else {
            (LEVEL_TINTS[level - 1].0, LEVEL_ACCENTS[level - 1].0)
        };
        let _ = writeln!(
            out,
            "{prefix}pre.glint .line.highlighted.hl-{level} {{ background-color: {tint}; box-shadow: inset 3px 0 0 {accent}; }}"
        );
    }
}

/// The stylesheet: block chrome plus the four highlight-level treatments
pub fn stylesheet(config: &HighlighterConfig) -> String {
    let mut css = String::new();

    let _ = writeln!(
        css,
        ".{RENDERED_CLASS} {{ position: relative; }}\n\
         pre.glint {{ margin: 0; padding: 0.75em 0; overflow-x: auto; border-radius: 4px; }}\n\
         pre.glint code {{ display: block; background: none; padding: 0; }}\n\
         pre.glint .line {{ display: inline-block; min-width: 100%; padding: 0 1em; box-sizing: border-box; }}\n\
         pre.glint .line.diff.add {{ background-color: rgba(16, 185, 129, 0.16); }}\n\
         pre.glint .line.diff.remove {{ background-color: rgba(244, 63, 94, 0.16); opacity: 0.7; }}\n\
         pre.glint.has-focused .line:not(.focused) {{ opacity: 0.55; filter: blur(0.04rem); }}\n\
         pre.glint .line.error {{ background-color: rgba(244, 63, 94, 0.16); }}\n\
         pre.glint .line.warning {{ background-color: rgba(234, 179, 8, 0.16); }}\n\
         .{COPY_CLASS} {{ position: absolute; top: 0.4em; right: 0.4em; opacity: 0; transition: opacity 0.1s; cursor: pointer; }}\n\
         .{RENDERED_CLASS}:hover .{COPY_CLASS}, .{COPY_CLASS}:focus {{ opacity: 1; }}\n\
         .{COPY_CLASS}[data-state=\"copied\"] {{ opacity: 1; }}\n\
         .{LOADING_CLASS} {{ opacity: 0.6; transition: opacity 0.2s; }}"
    );

    level_rules(&mut css, "", false);

    for root in dark_roots(config) {
        level_rules(&mut css, &format!("{} ", root), true);
    }

    css.push_str("@media (prefers-color-scheme: dark) {\n");
    level_rules(&mut css, "  ", true);
    css.push_str("}\n");

    css
}

/// The configuration as literal data
pub fn config_json(config: &HighlighterConfig) -> Result<String> {
    config
        .to_json()
        .map_err(|e| Error::Config(format!("cannot serialize config: {}", e)))
}

/// Write both assets into `dir`, creating it if needed
pub fn write_assets(dir: &Path, config: &HighlighterConfig) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let css_path = dir.join(STYLESHEET_FILE);
    fs::write(&css_path, stylesheet(config))?;

    let config_path = dir.join(CONFIG_FILE);
    fs::write(&config_path, config_json(config)?)?;

    tracing::info!(dir = %dir.display(), "assets written");
    Ok(vec![css_path, config_path])
}
