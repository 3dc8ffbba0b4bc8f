use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::ChildRef;
use crate::repository::GetSource;

/// Per-child resolution lifecycle. Absence from the map is the implicit
/// fourth state; entries never revert backward.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionState<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

pub type ResolutionMap<T> = HashMap<i64, ResolutionState<T>>;

/// Resolves a parent entity's reference list into fully-loaded children,
/// one independent fetch per child id, published as an observable map.
///
/// Each `resolve` call is a batch carrying a generation token. A new batch
/// rebuilds the map from scratch; completions from a superseded batch are
/// dropped, so navigating to a new parent can never be overwritten by a
/// late response for the old one. Fetch failures are scoped to their own
/// entry and never fail the batch.
///
/// Must be used inside a tokio runtime.
pub struct ResolutionEngine<T> {
    source: Arc<dyn GetSource<T>>,
    tx: watch::Sender<ResolutionMap<T>>,
    generation: Arc<AtomicU64>,
}

impl<T: Clone + Send + Sync + 'static> ResolutionEngine<T> {
    pub fn new(source: Arc<dyn GetSource<T>>) -> Self {
        let (tx, _) = watch::channel(HashMap::new());
        Self {
            source,
            tx,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ResolutionMap<T>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ResolutionMap<T> {
        self.tx.borrow().clone()
    }

    /// Every computed child id has finished resolving, successfully or
    /// not. An empty map counts as fully resolved.
    pub fn all_resolved(&self) -> bool {
        self.tx
            .borrow()
            .values()
            .all(|state| !matches!(state, ResolutionState::Loading))
    }

    /// Start resolving `refs`. References that yield no child id are
    /// skipped. An empty reference list clears the map.
    pub fn resolve<R: ChildRef>(&self, refs: &[R]) {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let mut map: ResolutionMap<T> = HashMap::new();
        for reference in refs {
            match reference.child_id() {
                Some(id) => {
                    map.insert(id, ResolutionState::Loading);
                }
                None => warn!("reference with no resolvable child id, skipping"),
            }
        }
        let ids: Vec<i64> = map.keys().copied().collect();
        self.tx.send_replace(map);

        for id in ids {
            let source = Arc::clone(&self.source);
            let tx = self.tx.clone();
            let generation = Arc::clone(&self.generation);
            tokio::spawn(async move {
                let next = match source.get(id).await {
                    Ok(child) => ResolutionState::Loaded(child),
                    Err(e) => ResolutionState::Failed(e.to_string()),
                };
                let applied = tx.send_if_modified(|map| {
                    if generation.load(Ordering::SeqCst) == token {
                        map.insert(id, next);
                        true
                    } else {
                        false
                    }
                });
                if !applied {
                    debug!("dropping resolution for child {} from a superseded batch", id);
                }
            });
        }
    }
}
