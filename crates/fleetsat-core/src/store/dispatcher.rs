// ── Action dispatcher ──
//
// Single-consumer action channel feeding the reducer, with the resulting
// state published through a `watch` channel. Dispatch never blocks and
// actions apply strictly in dispatch order, which is the store's only
// concurrency-safety mechanism — callbacks push actions, they never touch
// state directly.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::trace;

use super::actions::{Action, reduce};
use super::state::DomainState;

/// Cloneable handle to the domain state store.
///
/// Cheap to clone; all clones share the same reducer task. The task exits
/// when every handle has been dropped.
#[derive(Clone)]
pub struct StateStore {
    action_tx: mpsc::UnboundedSender<Action>,
    state_rx: watch::Receiver<Arc<DomainState>>,
}

impl StateStore {
    /// Create the store and spawn its reducer task.
    pub fn new() -> Self {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
        let (state_tx, state_rx) = watch::channel(Arc::new(DomainState::default()));

        tokio::spawn(async move {
            while let Some(action) = action_rx.recv().await {
                trace!(?action, "applying action");
                let next = reduce(&state_tx.borrow(), action);
                // send_modify updates unconditionally, even with zero receivers.
                state_tx.send_modify(|state| *state = Arc::new(next));
            }
            trace!("state store reducer exiting");
        });

        Self {
            action_tx,
            state_rx,
        }
    }

    /// Queue one action for the reducer. Never blocks.
    ///
    /// Dropped silently if the reducer has already exited (only possible
    /// during teardown).
    pub fn dispatch(&self, action: Action) {
        let _ = self.action_tx.send(action);
    }

    /// The latest published state snapshot (cheap `Arc` clone).
    ///
    /// Actions dispatched immediately before may not be visible yet;
    /// use [`subscribe`](Self::subscribe) to observe them applied.
    pub fn state(&self) -> Arc<DomainState> {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to state snapshots via a `watch::Receiver`.
    pub fn subscribe(&self) -> watch::Receiver<Arc<DomainState>> {
        self.state_rx.clone()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ──────────────────────────────────────────────────────────
