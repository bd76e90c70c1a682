//! Batch scheduler: discover pristine blocks, render them batch by batch

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::render::{Context, RenderOutcome, render_block, resolve_theme};
use crate::config::HighlighterConfig;
use crate::page::{BlockNode, LOADING_CLASS, NodeId, ReadyState};

/// What one call to [`Scheduler::run_cycle`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleReport {
    /// Another cycle was already running
    Skipped,
    Completed {
        candidates: usize,
        rendered: usize,
        skipped: usize,
        failed: usize,
    },
}

impl CycleReport {
    pub fn rendered(&self) -> usize {
        match self {
            CycleReport::Completed { rendered, .. } => *rendered,
            CycleReport::Skipped => 0,
        }
    }
}

/// Whether discovery picks this node up
pub fn is_candidate(node: &BlockNode, config: &HighlighterConfig) -> bool {
    !node.is_rendered()
        && (node.language_tag().is_some() || node.classes.is_empty())
        && !config
            .exclusion_markers
            .iter()
            .any(|marker| node.has_class(marker))
}

/// Clears the running flag when the cycle ends, however it ends
struct InFlight<'a>(&'a watch::Sender<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

pub struct Scheduler {
    ctx: Context,
    running: watch::Sender<bool>,
}

impl Scheduler {
    pub fn new(ctx: Context) -> Self {
        let (running, _) = watch::channel(false);
        Self { ctx, running }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    /// Resolves once no cycle is running
    pub async fn idle(&self) {
        let mut running = self.running.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = running.wait_for(|running| !*running).await;
    }

    /// One full pass over every eligible block
    ///
    /// Calls made while a cycle is running return [`CycleReport::Skipped`]
    /// without doing anything.
    pub async fn run_cycle(&self) -> CycleReport {
        let started = self
            .running
            .send_if_modified(|running| !std::mem::replace(running, true));
        if !started {
            tracing::debug!("cycle already in flight, skipping");
            return CycleReport::Skipped;
        }
        let _guard = InFlight(&self.running);

        let page = &self.ctx.page;
        let (theme, candidates) = {
            let page = page.read();
            let theme = resolve_theme(&page, &self.ctx.config);
            let candidates: Vec<NodeId> = page
                .blocks()
                .filter(|node| is_candidate(node, &self.ctx.config))
                .map(|node| node.id)
                .collect();
            (theme, candidates)
        };

        if candidates.is_empty() {
            return CycleReport::Completed {
                candidates: 0,
                rendered: 0,
                skipped: 0,
                failed: 0,
            };
        }

        {
            let mut page = page.write();
            for &id in &candidates {
                page.add_class(id, LOADING_CLASS);
            }
        }

        let (mut rendered, mut skipped, mut failed) = (0, 0, 0);
        for batch in candidates.chunks(self.ctx.config.batch_size.max(1)) {
            let outcomes = join_all(
                batch
                    .iter()
                    .map(|&id| render_block(&self.ctx, id, &theme)),
            )
            .await;
            for outcome in outcomes {
                match outcome {
                    RenderOutcome::Rendered(_) => rendered += 1,
                    RenderOutcome::Skipped(_) => skipped += 1,
                    RenderOutcome::Failed(_) => failed += 1,
                }
            }
        }

        {
            // Rendered nodes were replaced; the rest still carry the class
            let mut page = page.write();
            for &id in &candidates {
                page.remove_class(id, LOADING_CLASS);
            }
        }

        tracing::info!(
            theme = %theme,
            candidates = candidates.len(),
            rendered,
            skipped,
            failed,
            "cycle finished"
        );
        CycleReport::Completed {
            candidates: candidates.len(),
            rendered,
            skipped,
            failed,
        }
    }

    /// Schedule the startup cycles
    ///
    /// A cycle runs as soon as the page is interactive (immediately if it
    /// already is), after the short and fallback delays, and once more
    /// after the page completes. Overlapping triggers collapse into the
    /// cycle already running.
    pub fn install_triggers(self: &Arc<Self>, ready: watch::Receiver<ReadyState>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let timings = scheduler.ctx.config.timings;

            let on_interactive = {
                let mut ready = ready.clone();
                let scheduler = &scheduler;
                async move {
                    if ready.wait_for(|s| *s >= ReadyState::Interactive).await.is_ok() {
                        scheduler.trigger("interactive").await;
                    }
                }
            };
            let on_complete = {
                let mut ready = ready.clone();
                let scheduler = &scheduler;
                async move {
                    if ready.wait_for(|s| *s >= ReadyState::Complete).await.is_ok() {
                        scheduler.trigger("complete").await;
                    }
                }
            };
            let short = async {
                tokio::time::sleep(timings.short_delay()).await;
                scheduler.trigger("short delay").await;
            };
            let fallback = async {
                tokio::time::sleep(timings.fallback_delay()).await;
                scheduler.trigger("fallback delay").await;
            };

            futures::join!(on_interactive, on_complete, short, fallback);
        })
    }

    async fn trigger(&self, reason: &str) {
        let report = self.run_cycle().await;
        tracing::debug!(reason, ?report, "triggered cycle");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, RENDERED_CLASS};
    use crate::testing::{GatedLoader, PlainLoader, context_with};

    fn page_with(blocks: &[(&[&str], &str)]) -> Page {
        let mut page = Page::new();
        for (classes, text) in blocks {
            page.add_block(classes, text);
        }
        page
    }

    #[test]
    fn test_discovery_rules() {
        let config = HighlighterConfig::default();
        let page = page_with(&[
            (&["language-rust"], "a"),
            (&[], "b"),
            (&["playground"], "c"),
            (&["language-repl"], "d"),
            (&["language-python", "nohighlight"], "e"),
        ]);
        let picked: Vec<bool> = page.blocks().map(|n| is_candidate(n, &config)).collect();
        assert_eq!(picked, vec![true, true, false, false, false]);
    }

    #[tokio::test]
    async fn test_cycle_renders_in_batches_and_clears_loading() {
        let blocks: Vec<(&[&str], &str)> = (0..7)
            .map(|_| (&["language-rust"][..], "fn a() {}"))
            .chain([(&["language-cobol"][..], "MOVE A TO B.")])
            .collect();
        let ctx = context_with(page_with(&blocks), PlainLoader::default());
        let scheduler = Scheduler::new(ctx.clone());

        let report = scheduler.run_cycle().await;
        assert_eq!(
            report,
            CycleReport::Completed {
                candidates: 8,
                rendered: 7,
                skipped: 1,
                failed: 0
            }
        );

        let page = ctx.page.read();
        for node in page.blocks() {
            assert!(!node.has_class(LOADING_CLASS));
        }
        let cobol = page.blocks().last().unwrap();
        assert_eq!(cobol.classes, vec!["language-cobol"]);
    }

    #[tokio::test]
    async fn test_second_cycle_is_idempotent() {
        let ctx = context_with(
            page_with(&[(&["language-rust"], "// @highlight: 1\nfn a() {}")]),
            PlainLoader::default(),
        );
        let scheduler = Scheduler::new(ctx.clone());

        scheduler.run_cycle().await;
        let first = ctx.page.to_html();
        let report = scheduler.run_cycle().await;

        assert_eq!(report.rendered(), 0);
        assert_eq!(ctx.page.to_html(), first);
        let page = ctx.page.read();
        assert_eq!(page.blocks().next().unwrap().classes, vec![RENDERED_CLASS]);
    }

    #[tokio::test]
    async fn test_overlapping_cycles_are_dropped() {
        let loader = GatedLoader::new();
        let ctx = context_with(
            page_with(&[(&["language-rust"], "fn a() {}"), (&[], "b")]),
            loader.clone(),
        );
        let scheduler = Scheduler::new(ctx.clone());

        let (first, second) = futures::join!(scheduler.run_cycle(), async {
            tokio::task::yield_now().await;
            assert!(scheduler.is_running());
            let report = scheduler.run_cycle().await;
            loader.open();
            report
        });

        assert_eq!(second, CycleReport::Skipped);
        assert_eq!(first.rendered(), 2);
        assert_eq!(loader.constructions(), 1);
        assert!(!scheduler.is_running());
        assert!(ctx.page.read().blocks().all(|n| n.is_rendered()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_triggers_render_once_interactive() {
        let ctx = context_with(
            page_with(&[(&["language-go"], "package main")]),
            PlainLoader::default(),
        );
        let scheduler = Arc::new(Scheduler::new(ctx.clone()));

        let triggers = scheduler.install_triggers(ctx.page.ready_state());
        ctx.page.set_ready_state(ReadyState::Interactive);
        tokio::task::yield_now().await;
        tokio::time::sleep(ctx.config.timings.short_delay()).await;
        assert!(ctx.page.read().blocks().all(|n| n.is_rendered()));

        // Blocks added later are picked up by the remaining triggers
        ctx.page.write().add_block(&["language-go"], "func main() {}");
        ctx.page.set_ready_state(ReadyState::Complete);
        triggers.await.unwrap();
        assert!(ctx.page.read().blocks().all(|n| n.is_rendered()));
    }
}
