use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::event::EventStream;
use crossterm::terminal;
use futures::StreamExt;

use glint::cli::{CliArgs, Command};
use glint::config::{ConfigEngine, HighlighterConfig};
use glint::debug::DebugHandle;
use glint::input::{self, WatchCommand};
use glint::page::{Page, ReadyState, SharedPage, SystemClipboard, copy_block};
use glint::pipeline::{Context, CycleReport, Scheduler, ThemeReactor};
use glint::syntax::{EngineCache, TreeSitterLoader};
use glint::{assets, logging};

/// `--config` may name a rhai script or a JSON config asset
fn load_config(path: Option<&Path>) -> Result<HighlighterConfig> {
    let mut engine = ConfigEngine::new();
    match path {
        Some(path) if path.extension().is_some_and(|e| e == "json") => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            return HighlighterConfig::from_json(&json)
                .with_context(|| format!("parsing {}", path.display()));
        }
        Some(path) => engine.load_file(path)?,
        None => engine.load_default()?,
    }
    Ok(engine.config())
}

fn start_session(html: &str, config: HighlighterConfig) -> Arc<Scheduler> {
    let config = Arc::new(config);
    let engines = Arc::new(EngineCache::new(Arc::new(TreeSitterLoader)));
    let page = SharedPage::new(Page::from_html(html));
    Arc::new(Scheduler::new(Context::new(config, engines, page)))
}

fn read_page(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

async fn render(input: &Path, output: Option<&Path>, dark: bool, config: HighlighterConfig) -> Result<()> {
    let scheduler = start_session(&read_page(input)?, config);
    let page = &scheduler.context().page;
    page.set_prefers_dark(dark);
    page.set_ready_state(ReadyState::Complete);

    let report = scheduler.run_cycle().await;
    tracing::info!(?report, "render finished");

    let html = page.to_html();
    match output {
        Some(path) => fs::write(path, html).with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", html),
    }
    Ok(())
}

/// Raw mode swallows `\n`; every status line ends in `\r\n`
fn status(message: &str) {
    eprint!("{}\r\n", message);
}

fn describe(report: CycleReport) -> String {
    match report {
        CycleReport::Skipped => "cycle already running".to_string(),
        CycleReport::Completed {
            candidates,
            rendered,
            skipped,
            failed,
        } => format!(
            "{} candidates: {} rendered, {} skipped, {} failed",
            candidates, rendered, skipped, failed
        ),
    }
}

async fn watch(input: &Path, output: &Path, config: HighlighterConfig) -> Result<()> {
    let scheduler = start_session(&read_page(input)?, config);
    let ctx = scheduler.context().clone();
    let debug = DebugHandle::new(Arc::clone(&scheduler));

    let reactor = ThemeReactor::new(Arc::clone(&scheduler)).spawn(ctx.page.observe_theme());
    let triggers = scheduler.install_triggers(ctx.page.ready_state());
    ctx.page.set_ready_state(ReadyState::Interactive);
    ctx.page.set_ready_state(ReadyState::Complete);

    terminal::enable_raw_mode()?;
    status(&format!("watching {} -> {}", input.display(), output.display()));
    let result = watch_loop(&ctx, &debug, output).await;
    terminal::disable_raw_mode()?;

    reactor.abort();
    triggers.abort();
    result
}

async fn watch_loop(ctx: &Context, debug: &DebugHandle, output: &Path) -> Result<()> {
    let mut event_stream = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_millis(200));
    let mut written = None;

    loop {
        tokio::select! {
            Some(Ok(event)) = event_stream.next() => {
                let Some(command) = input::handle_event(&event) else {
                    continue;
                };
                match command {
                    WatchCommand::ToggleDarkClass => {
                        let Some(indicator) = ctx.config.dark_indicators.first() else {
                            status("no dark indicators configured");
                            continue;
                        };
                        let on = !ctx.page.read().root().has_class(indicator);
                        ctx.page.set_root_class(indicator, on);
                        status(&format!("root class `{}` {}", indicator, if on { "on" } else { "off" }));
                    }
                    WatchCommand::TogglePreference => {
                        let dark = !ctx.page.read().prefers_dark();
                        ctx.page.set_prefers_dark(dark);
                        status(&format!("prefers dark: {}", dark));
                    }
                    WatchCommand::Rerun => status(&describe(debug.rerun().await)),
                    WatchCommand::ShowTheme => status(&format!("active theme: {}", debug.active_theme())),
                    WatchCommand::CopyFirst => {
                        let first = ctx.page.read().blocks().find(|n| n.is_rendered()).map(|n| n.id);
                        match first {
                            Some(id) => {
                                let page = ctx.page.clone();
                                let timings = ctx.config.timings;
                                tokio::spawn(async move {
                                    if let Err(e) = copy_block(&page, id, &SystemClipboard, &timings).await {
                                        tracing::warn!("{}", e);
                                    }
                                });
                                status("copied first block");
                            }
                            None => status("nothing rendered yet"),
                        }
                    }
                    WatchCommand::Quit => break,
                }
            }
            _ = tick.tick() => {
                let generation = ctx.page.generation();
                if written != Some(generation) {
                    fs::write(output, ctx.page.to_html())
                        .with_context(|| format!("writing {}", output.display()))?;
                    written = Some(generation);
                }
            }
        }
    }

    // Flush whatever the last commands changed
    fs::write(output, ctx.page.to_html()).with_context(|| format!("writing {}", output.display()))?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Render { input, output, dark } => render(&input, output.as_deref(), dark, config).await,
        Command::Assets { dir } => {
            for path in assets::write_assets(&dir, &config)? {
                println!("{}", path.display());
            }
            Ok(())
        }
        Command::Watch { input, output } => watch(&input, &output, config).await,
    }
}
