use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::repository::GetSource;

/// Lifecycle of one detail screen, keyed by the requested id.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState<T> {
    Loading,
    Success(T),
    Error(String),
}

/// Detail-screen state machine over any [`GetSource`].
///
/// `load` always starts a brand-new fetch and passes through `Loading`,
/// including repeat loads of the same id — this machine never caches.
/// Each dispatch carries a generation token; a completion whose token no
/// longer matches the current generation is dropped, so a slow response
/// for a previous id can never clobber the state of a newer load.
///
/// Must be created inside a tokio runtime.
pub struct DetailStateMachine<T> {
    source: Arc<dyn GetSource<T>>,
    tx: watch::Sender<DetailState<T>>,
    generation: Arc<AtomicU64>,
    last_id: Mutex<Option<i64>>,
}

impl<T: Clone + Send + Sync + 'static> DetailStateMachine<T> {
    pub fn new(source: Arc<dyn GetSource<T>>) -> Self {
        let (tx, _) = watch::channel(DetailState::Loading);
        Self {
            source,
            tx,
            generation: Arc::new(AtomicU64::new(0)),
            last_id: Mutex::new(None),
        }
    }

    /// Create the machine and immediately load `id`.
    pub fn start(source: Arc<dyn GetSource<T>>, id: i64) -> Self {
        let machine = Self::new(source);
        machine.load(id);
        machine
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState<T>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> DetailState<T> {
        self.tx.borrow().clone()
    }

    pub fn load(&self, id: i64) {
        *self.last_id.lock().unwrap() = Some(id);
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_replace(DetailState::Loading);

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let generation = Arc::clone(&self.generation);
        tokio::spawn(async move {
            let next = match source.get(id).await {
                Ok(entity) => DetailState::Success(entity),
                Err(e) => {
                    warn!("detail fetch for id {} failed: {}", id, e);
                    DetailState::Error(e.to_string())
                }
            };
            let applied = tx.send_if_modified(|state| {
                if generation.load(Ordering::SeqCst) == token {
                    *state = next;
                    true
                } else {
                    false
                }
            });
            if !applied {
                debug!("dropping stale detail response for id {}", id);
            }
        });
    }

    /// Repeat the most recent `load`. No-op if nothing was ever loaded.
    pub fn retry(&self) {
        let id = *self.last_id.lock().unwrap();
        if let Some(id) = id {
            self.load(id);
        }
    }
}
