use std::sync::Arc;

use tokio::sync::watch;
use tracing::warn;

use crate::repository::ListSource;

/// Lifecycle of one collection screen. Exactly one state is active at a
/// time; an empty remote list lands in `Empty`, never `Success(vec![])`.
#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Loading,
    Success(Vec<T>),
    Empty,
    Error(String),
}

/// Collection-screen state machine over any [`ListSource`].
///
/// Construction enters `Loading` and dispatches the first fetch
/// immediately. `refresh` is callable from any state — retry from `Error`,
/// pull-to-refresh from `Success`. Concurrent refreshes are not
/// deduplicated; every dispatch completes and the published state reflects
/// whichever result lands last.
///
/// The machine only ever publishes remote results. Consumers that want to
/// paint the last locally stored snapshot while the first fetch is in
/// flight read it from the repository's `cached()` before subscribing
/// (e.g. [`crate::repository::AlbumRepository::cached`]).
///
/// Must be created inside a tokio runtime.
pub struct ListStateMachine<T> {
    source: Arc<dyn ListSource<T>>,
    tx: watch::Sender<ListState<T>>,
}

impl<T: Clone + Send + Sync + 'static> ListStateMachine<T> {
    pub fn new(source: Arc<dyn ListSource<T>>) -> Self {
        let (tx, _) = watch::channel(ListState::Loading);
        let machine = Self { source, tx };
        machine.refresh();
        machine
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<T>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ListState<T> {
        self.tx.borrow().clone()
    }

    pub fn refresh(&self) {
        self.tx.send_replace(ListState::Loading);
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let next = match source.list().await {
                Ok(items) if items.is_empty() => ListState::Empty,
                Ok(items) => ListState::Success(items),
                Err(e) => {
                    warn!("list fetch failed: {}", e);
                    ListState::Error(e.to_string())
                }
            };
            tx.send_replace(next);
        });
    }
}
