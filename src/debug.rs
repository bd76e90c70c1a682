//! Debug handle for poking at a running session

use std::sync::Arc;

use crate::config::HighlighterConfig;
use crate::pipeline::{CycleReport, Scheduler, resolve_theme};

#[derive(Clone)]
pub struct DebugHandle {
    scheduler: Arc<Scheduler>,
}

impl DebugHandle {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        Self { scheduler }
    }

    /// Run a cycle now
    pub async fn rerun(&self) -> CycleReport {
        self.scheduler.run_cycle().await
    }

    pub fn config(&self) -> Arc<HighlighterConfig> {
        Arc::clone(&self.scheduler.context().config)
    }

    /// Theme a cycle started now would render with
    pub fn active_theme(&self) -> String {
        let ctx = self.scheduler.context();
        resolve_theme(&ctx.page.read(), &ctx.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::testing::{PlainLoader, context_with};

    #[tokio::test]
    async fn test_debug_handle() {
        let mut page = Page::new();
        page.add_block(&[], "hello");
        let ctx = context_with(page, PlainLoader::default());
        let debug = DebugHandle::new(Arc::new(Scheduler::new(ctx.clone())));

        assert_eq!(debug.active_theme(), "gruvbox-light");
        ctx.page.set_prefers_dark(true);
        assert_eq!(debug.active_theme(), "gruvbox-dark");

        assert_eq!(debug.rerun().await.rendered(), 1);
        assert_eq!(debug.config().batch_size, 5);
    }
}
