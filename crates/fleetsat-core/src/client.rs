// ── Fleet client facade ──
//
// The single entry point the binary (and embedding applications) hold: it
// owns the state store, publishes identity changes, runs the orchestrator
// in the background, and exposes the event-logging write path. Cheap to
// clone; all clones share one state.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::error::CoreError;
use crate::hasher::{HashPayload, generate_hash};
use crate::model::{SecurityEventType, Severity, UserProfile};
use crate::orchestrator::SubscriptionOrchestrator;
use crate::rowstore::{RowStore, tables};
use crate::store::{Action, DomainState, StateStore};

/// Handle to a running fleet client.
#[derive(Clone)]
pub struct FleetClient<R> {
    inner: Arc<Inner<R>>,
}

struct Inner<R> {
    rows: Arc<R>,
    store: StateStore,
    identity_tx: watch::Sender<Option<UserProfile>>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<R: RowStore> FleetClient<R> {
    pub fn new(rows: R) -> Self {
        Self::from_arc(Arc::new(rows))
    }

    pub fn from_arc(rows: Arc<R>) -> Self {
        let (identity_tx, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                rows,
                store: StateStore::new(),
                identity_tx,
                cancel: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Start the background orchestrator. Call once; further calls are
    /// no-ops.
    pub async fn start(&self) {
        let mut tasks = self.inner.tasks.lock().await;
        if !tasks.is_empty() {
            trace!("fleet client already started");
            return;
        }
        let orchestrator = SubscriptionOrchestrator::new(
            Arc::clone(&self.inner.rows),
            self.inner.store.clone(),
        );
        let identity = self.inner.identity_tx.subscribe();
        let cancel = self.inner.cancel.child_token();
        tasks.push(tokio::spawn(orchestrator.run(identity, cancel)));
        debug!("fleet client started");
    }

    /// Tear down the orchestrator and every open subscription.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut tasks = self.inner.tasks.lock().await;
        for task in tasks.drain(..) {
            let _ = task.await;
        }
        debug!("fleet client stopped");
    }

    /// Publish a signed-in identity; the orchestrator rebinds on observe.
    pub fn sign_in(&self, user: UserProfile) {
        self.inner.identity_tx.send_replace(Some(user));
    }

    /// Clear the identity; fleet state is emptied and subscriptions close.
    pub fn sign_out(&self) {
        self.inner.identity_tx.send_replace(None);
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.inner.identity_tx.borrow().clone()
    }

    /// Narrow or clear the company filter.
    pub fn select_company(&self, company_id: Option<String>) {
        self.inner
            .store
            .dispatch(Action::SetSelectedCompany(company_id));
    }

    /// The current domain state.
    pub fn state(&self) -> Arc<DomainState> {
        self.inner.store.state()
    }

    /// Subscribe to every state change.
    pub fn watch_state(&self) -> watch::Receiver<Arc<DomainState>> {
        self.inner.store.subscribe()
    }

    /// Record a security event with a tamper-evident hash.
    ///
    /// Without a signed-in identity this is a silent no-op: anonymous
    /// events are worthless as evidence, and panic-button paths must not
    /// surface spurious errors to the operator.
    pub async fn log_security_event(
        &self,
        event_type: SecurityEventType,
        severity: Severity,
        details: serde_json::Value,
        vehicle_id: Option<&str>,
    ) -> Result<(), CoreError> {
        let Some(user) = self.current_user() else {
            trace!("no identity; security event discarded");
            return Ok(());
        };

        let timestamp = Utc::now().to_rfc3339();
        let legal_hash = generate_hash(&HashPayload {
            event_type,
            severity,
            vehicle_id,
            details: &details,
            user_id: &user.id,
            timestamp: timestamp.clone(),
        })?;

        // Location is lifted out of the details when present so the
        // service can index it.
        let location = details.get("location").cloned().unwrap_or(
            serde_json::Value::Null,
        );

        let row = json!({
            "user_id": user.id,
            "vehicle_id": vehicle_id,
            "type": event_type,
            "severity": severity,
            "location": location,
            "timestamp": timestamp,
            "legal_hash": legal_hash,
            "details": details,
        });

        self.inner
            .rows
            .insert(tables::SECURITY_EVENTS, row)
            .await
            .map_err(|e| CoreError::store_write(&e))?;

        debug!(%severity, "security event recorded");
        Ok(())
    }
}
