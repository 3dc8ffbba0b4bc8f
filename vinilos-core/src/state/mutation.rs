use std::future::Future;

use tokio::sync::watch;
use tracing::warn;

use crate::error::FetchError;

/// Lifecycle of a single in-flight write (create an entity, associate two
/// entities). `Saved`/`Failed` are terminal until consumed with
/// [`MutationStateMachine::clear`].
#[derive(Debug, Clone, PartialEq)]
pub enum MutationState {
    Idle,
    Saving,
    Saved,
    Failed(String),
}

/// Write-operation state machine.
///
/// Tracks one write at a time and reports only its own outcome; scheduling
/// the follow-up list refresh is the caller's job. A trigger is accepted
/// only from `Idle`: triggering while saving, or before a terminal
/// `Saved`/`Failed` has been consumed with [`MutationStateMachine::clear`],
/// is ignored.
///
/// Must be used inside a tokio runtime.
pub struct MutationStateMachine {
    tx: watch::Sender<MutationState>,
}

impl MutationStateMachine {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(MutationState::Idle);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> MutationState {
        self.tx.borrow().clone()
    }

    /// Run `op` as the tracked write: `Idle -> Saving -> Saved | Failed`.
    pub fn run<F>(&self, op: F)
    where
        F: Future<Output = Result<(), FetchError>> + Send + 'static,
    {
        let started = self.tx.send_if_modified(|state| {
            if matches!(state, MutationState::Idle) {
                *state = MutationState::Saving;
                true
            } else {
                false
            }
        });
        if !started {
            warn!("write not idle, ignoring trigger");
            return;
        }

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let next = match op.await {
                Ok(()) => MutationState::Saved,
                Err(e) => {
                    warn!("write failed: {}", e);
                    MutationState::Failed(e.to_string())
                }
            };
            tx.send_replace(next);
        });
    }

    /// Consume a terminal `Saved`/`Failed` and return to `Idle`. Ignored
    /// while saving.
    pub fn clear(&self) {
        self.tx.send_if_modified(|state| match state {
            MutationState::Saved | MutationState::Failed(_) => {
                *state = MutationState::Idle;
                true
            }
            _ => false,
        });
    }
}

impl Default for MutationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
