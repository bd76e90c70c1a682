//! Command-line arguments for the `glint` binary

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Highlight the code blocks of a generated documentation page
#[derive(Parser, Debug)]
#[command(
    name = "glint",
    version,
    about = "Highlight the code blocks of a generated documentation page",
    after_help = "watch keys: t dark class, p OS preference, r rerun, i theme, c copy, q quit"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// rhai script, or a JSON config asset when the extension is `.json`
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Render every block of a page once
    Render {
        /// Page to read
        input: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Render as if the OS prefers a dark colour scheme
        #[arg(long)]
        dark: bool,
    },
    /// Write the stylesheet and config asset
    Assets {
        /// Directory to write into, created if missing
        dir: PathBuf,
    },
    /// Keep a page rendered while toggling theme state from the keyboard
    Watch {
        input: PathBuf,
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("glint").chain(args.iter().copied()))
    }

    #[test]
    fn test_render_with_options() {
        let args = parse(&["render", "page.html", "-o", "out.html", "--dark", "--config", "init.rhai"]).unwrap();
        assert_eq!(
            args.command,
            Command::Render {
                input: PathBuf::from("page.html"),
                output: Some(PathBuf::from("out.html")),
                dark: true,
            }
        );
        assert_eq!(args.config, Some(PathBuf::from("init.rhai")));
    }

    #[test]
    fn test_render_defaults() {
        let args = parse(&["render", "page.html"]).unwrap();
        assert_eq!(
            args.command,
            Command::Render {
                input: PathBuf::from("page.html"),
                output: None,
                dark: false,
            }
        );
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_config_is_global() {
        let args = parse(&["--config", "glint-config.json", "assets", "theme"]).unwrap();
        assert_eq!(args.command, Command::Assets { dir: PathBuf::from("theme") });
        assert_eq!(args.config, Some(PathBuf::from("glint-config.json")));
    }

    #[test]
    fn test_watch_needs_both_paths() {
        assert!(parse(&["watch", "page.html"]).is_err());
        let args = parse(&["watch", "page.html", "out.html"]).unwrap();
        assert_eq!(
            args.command,
            Command::Watch {
                input: PathBuf::from("page.html"),
                output: PathBuf::from("out.html"),
            }
        );
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(parse(&["serve", "page.html"]).is_err());
        assert!(parse(&[]).is_err());
    }
}
