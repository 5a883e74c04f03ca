// ── Subscription orchestrator ──
//
// Binds the dashboard's data flows to the current identity: on sign-in it
// runs the snapshot fetches and opens the three change subscriptions; on
// sign-out or identity change it closes everything, in that order, before
// binding anew. Unsubscribe-before-resubscribe keeps at most one live
// subscription set per process.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use fleetsat_store::{ChangeKind, SubscriptionHandle};

use crate::convert::{map_location_row, map_security_event_row, map_vehicle_row};
use crate::error::CoreError;
use crate::model::{Company, UserProfile};
use crate::rowstore::{RowStore, tables};
use crate::store::{Action, StateStore};

/// Drives snapshot fetches and change subscriptions from identity state.
pub struct SubscriptionOrchestrator<R> {
    rows: Arc<R>,
    store: StateStore,
}

/// One identity's worth of running tasks, torn down as a unit.
struct SessionBinding {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SessionBinding {
    async fn close(self) {
        self.cancel.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

impl<R: RowStore> SubscriptionOrchestrator<R> {
    pub fn new(rows: Arc<R>, store: StateStore) -> Self {
        Self { rows, store }
    }

    /// Run until `cancel` fires, rebinding on every identity change.
    ///
    /// The previous binding is fully closed (subscriptions and fetch tasks
    /// joined) before a new one is opened.
    pub async fn run(
        self,
        mut identity: watch::Receiver<Option<UserProfile>>,
        cancel: CancellationToken,
    ) {
        let mut binding: Option<SessionBinding> = None;

        loop {
            let user = identity.borrow_and_update().clone();

            if let Some(prior) = binding.take() {
                prior.close().await;
            }

            match user {
                Some(user) => {
                    debug!(user_id = %user.id, "binding data flows");
                    binding = Some(self.bind());
                }
                None => {
                    trace!("no identity; clearing fleet state");
                    self.store.dispatch(Action::SetVehicles(Vec::new()));
                    self.store.dispatch(Action::SetCompanies(Vec::new()));
                }
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                changed = identity.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        if let Some(prior) = binding.take() {
            prior.close().await;
        }
    }

    /// Open the snapshot fetches and the three change subscriptions.
    fn bind(&self) -> SessionBinding {
        let cancel = CancellationToken::new();
        let mut tasks = Vec::with_capacity(4);

        self.store.dispatch(Action::SetLoading(true));

        tasks.push(tokio::spawn({
            let rows = Arc::clone(&self.rows);
            let store = self.store.clone();
            let cancel = cancel.clone();
            async move {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {}
                    () = fetch_snapshots(rows, store) => {}
                }
            }
        }));

        tasks.push(self.spawn_pump(
            tables::VEHICLES,
            ChangeKind::Update,
            cancel.clone(),
            |row| map_vehicle_row(row).map(Action::UpdateVehicle),
        ));
        tasks.push(self.spawn_pump(
            tables::VEHICLE_LOCATIONS,
            ChangeKind::Insert,
            cancel.clone(),
            |row| map_location_row(row).map(|(id, update)| Action::UpdateVehicleLocation { id, update }),
        ));
        tasks.push(self.spawn_pump(
            tables::SECURITY_EVENTS,
            ChangeKind::Insert,
            cancel.clone(),
            |row| map_security_event_row(row).map(Action::AddSecurityEvent),
        ));

        SessionBinding { cancel, tasks }
    }

    fn spawn_pump(
        &self,
        table: &'static str,
        kind: ChangeKind,
        cancel: CancellationToken,
        map: impl Fn(&serde_json::Value) -> Option<Action> + Send + 'static,
    ) -> JoinHandle<()> {
        let sub = self.rows.subscribe(table, kind);
        let store = self.store.clone();
        tokio::spawn(pump_subscription(sub, cancel, store, map))
    }
}

/// Translate each change notification into exactly one action, or drop it.
async fn pump_subscription(
    mut sub: SubscriptionHandle,
    cancel: CancellationToken,
    store: StateStore,
    map: impl Fn(&serde_json::Value) -> Option<Action>,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            change = sub.recv() => {
                let Some(change) = change else { break };
                match map(&change.row) {
                    Some(action) => store.dispatch(action),
                    None => trace!(table = %change.table, "dropped unmappable change row"),
                }
            }
        }
    }
    sub.close();
}

/// One-shot snapshot fetches: companies, then vehicles.
///
/// Loading is cleared in both outcomes — `SetVehicles` clears it on
/// success, and an explicit `SetLoading(false)` clears it on failure so
/// the dashboard never spins forever.
async fn fetch_snapshots<R: RowStore>(rows: Arc<R>, store: StateStore) {
    match rows.select_all(tables::COMPANIES).await {
        Ok(raw) => {
            let companies: Vec<Company> = raw
                .into_iter()
                .filter_map(|row| {
                    serde_json::from_value(row)
                        .map_err(|e| trace!(error = %e, "dropped malformed company row"))
                        .ok()
                })
                .collect();
            store.dispatch(Action::SetCompanies(companies));
        }
        Err(e) => {
            warn!(error = %CoreError::store_fetch(&e), "company snapshot fetch failed");
        }
    }

    match rows.select_all(tables::VEHICLES).await {
        Ok(raw) => {
            let vehicles: Vec<_> = raw.iter().filter_map(map_vehicle_row).collect();
            debug!(count = vehicles.len(), "loaded vehicle snapshot");
            store.dispatch(Action::SetVehicles(vehicles));
        }
        Err(e) => {
            warn!(error = %CoreError::store_fetch(&e), "vehicle snapshot fetch failed");
            store.dispatch(Action::SetLoading(false));
        }
    }
}
