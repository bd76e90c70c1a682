//! Cloneable page handle with change notifications

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{mpsc, watch};

use super::copy::CopyState;
use super::document::{NodeId, Page, ReadyState};

/// A change that may affect which theme is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeEvent {
    /// Class or attribute on the root element changed
    RootMutated,
    /// OS colour-scheme preference changed
    ColorSchemeChanged { dark: bool },
}

struct Inner {
    page: RwLock<Page>,
    observers: Mutex<Vec<mpsc::UnboundedSender<ThemeEvent>>>,
    ready: watch::Sender<ReadyState>,
    /// Bumped on every mutation made through this handle
    generation: AtomicU64,
}

#[derive(Clone)]
pub struct SharedPage {
    inner: Arc<Inner>,
}

impl SharedPage {
    pub fn new(page: Page) -> Self {
        let (ready, _) = watch::channel(ReadyState::Loading);
        Self {
            inner: Arc::new(Inner {
                page: RwLock::new(page),
                observers: Mutex::new(Vec::new()),
                ready,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Short read section; never hold across an `.await`
    pub fn read(&self) -> RwLockReadGuard<'_, Page> {
        self.inner.page.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Short write section; never hold across an `.await`
    pub fn write(&self) -> RwLockWriteGuard<'_, Page> {
        self.inner.generation.fetch_add(1, Ordering::Relaxed);
        self.inner.page.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Relaxed)
    }

    /// Subscribe to theme-affecting changes
    pub fn observe_theme(&self) -> mpsc::UnboundedReceiver<ThemeEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    fn emit(&self, event: ThemeEvent) {
        let mut observers = self
            .inner
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        observers.retain(|tx| tx.send(event).is_ok());
        tracing::trace!(?event, observers = observers.len(), "theme event");
    }

    /// Toggle a root class; emits [`ThemeEvent::RootMutated`] on change
    pub fn set_root_class(&self, class: &str, on: bool) -> bool {
        let changed = self.write().root_mut().set_class(class, on);
        if changed {
            self.emit(ThemeEvent::RootMutated);
        }
        changed
    }

    /// Set or clear a root attribute; emits [`ThemeEvent::RootMutated`] on change
    pub fn set_root_attr(&self, name: &str, value: Option<&str>) -> bool {
        let changed = self.write().root_mut().set_attr(name, value);
        if changed {
            self.emit(ThemeEvent::RootMutated);
        }
        changed
    }

    pub fn set_prefers_dark(&self, dark: bool) -> bool {
        let changed = {
            let mut page = self.write();
            let changed = page.prefers_dark() != dark;
            page.set_prefers_dark(dark);
            changed
        };
        if changed {
            self.emit(ThemeEvent::ColorSchemeChanged { dark });
        }
        changed
    }

    pub fn set_copy_state(&self, node: NodeId, state: CopyState) -> bool {
        self.write().set_copy_state(node, state)
    }

    /// Advance the ready state; going backwards is ignored
    pub fn set_ready_state(&self, state: ReadyState) {
        self.inner.ready.send_if_modified(|current| {
            if state > *current {
                *current = state;
                true
            } else {
                false
            }
        });
    }

    pub fn ready_state(&self) -> watch::Receiver<ReadyState> {
        self.inner.ready.subscribe()
    }

    pub fn to_html(&self) -> String {
        self.read().to_html()
    }
}

impl std::fmt::Debug for SharedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedPage")
            .field("blocks", &self.read().block_count())
            .field("generation", &self.generation())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_changes_emit_once() {
        let page = SharedPage::new(Page::new());
        let mut events = page.observe_theme();

        assert!(page.set_root_class("dark", true));
        assert!(!page.set_root_class("dark", true));
        assert!(page.set_root_attr("data-theme", Some("navy")));

        assert_eq!(events.try_recv(), Ok(ThemeEvent::RootMutated));
        assert_eq!(events.try_recv(), Ok(ThemeEvent::RootMutated));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_color_scheme_events() {
        let page = SharedPage::new(Page::new());
        let mut events = page.observe_theme();

        assert!(!page.set_prefers_dark(false));
        assert!(page.set_prefers_dark(true));
        assert_eq!(
            events.try_recv(),
            Ok(ThemeEvent::ColorSchemeChanged { dark: true })
        );
        assert!(page.read().prefers_dark());
    }

    #[test]
    fn test_dropped_observers_are_pruned() {
        let page = SharedPage::new(Page::new());
        drop(page.observe_theme());
        let mut live = page.observe_theme();
        page.set_root_class("x", true);
        assert_eq!(live.try_recv(), Ok(ThemeEvent::RootMutated));
        assert_eq!(page.inner.observers.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_ready_state_only_advances() {
        let page = SharedPage::new(Page::new());
        let ready = page.ready_state();
        page.set_ready_state(ReadyState::Complete);
        page.set_ready_state(ReadyState::Interactive);
        assert_eq!(*ready.borrow(), ReadyState::Complete);
    }

    #[test]
    fn test_generation_tracks_writes() {
        let page = SharedPage::new(Page::new());
        let before = page.generation();
        page.write().add_block(&[], "x");
        assert!(page.generation() > before);
    }
}
