//! Theme change reactor: restore rendered blocks and render them again

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::scheduler::{CycleReport, Scheduler};
use crate::page::{NodeId, ThemeEvent};

pub struct ThemeReactor {
    scheduler: Arc<Scheduler>,
}

impl ThemeReactor {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        Self { scheduler }
    }

    /// Put every rendered block back to its captured source; returns how
    /// many were restored
    pub fn restore_all(&self) -> usize {
        let mut page = self.scheduler.context().page.write();
        let rendered: Vec<NodeId> = page
            .blocks()
            .filter(|node| node.is_rendered())
            .map(|node| node.id)
            .collect();
        rendered.into_iter().filter(|&id| page.restore(id)).count()
    }

    /// React to one theme event
    ///
    /// A cycle that was already running resolved its theme before the
    /// change, so the reactor waits for it and starts over until it gets a
    /// cycle of its own.
    pub async fn handle(&self, event: ThemeEvent) -> CycleReport {
        let settle = self.scheduler.context().config.timings.settle();
        loop {
            let restored = self.restore_all();
            tracing::debug!(?event, restored, "theme changed");

            tokio::time::sleep(settle).await;
            match self.scheduler.run_cycle().await {
                CycleReport::Skipped => self.scheduler.idle().await,
                report => return report,
            }
        }
    }

    /// Consume events until every sender is gone
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<ThemeEvent>) {
        while let Some(mut event) = events.recv().await {
            // A burst of mutations needs only one re-render
            while let Ok(next) = events.try_recv() {
                event = next;
            }
            self.handle(event).await;
        }
    }

    pub fn spawn(self, events: mpsc::UnboundedReceiver<ThemeEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}
