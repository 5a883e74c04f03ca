#![allow(clippy::unwrap_used)]
#![allow(dead_code)] // each test binary uses a different subset
// Shared fakes for the core integration tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use fleetsat_core::position::{PositionError, PositionFix, PositionSource, WatchOptions};
use fleetsat_core::rowstore::RowStore;
use fleetsat_store::{ChangeKind, ChangeRow, Error, SubscriptionHandle};

// ── Mock row store ──────────────────────────────────────────────────

/// In-process `RowStore`: records inserts, serves canned select results,
/// vends live subscriptions from a broadcast channel.
pub struct MockRowStore {
    inserts: Mutex<Vec<(String, serde_json::Value)>>,
    selects: Mutex<HashMap<String, Vec<serde_json::Value>>>,
    failing_selects: Mutex<HashSet<String>>,
    fail_inserts: AtomicBool,
    changes_tx: broadcast::Sender<Arc<ChangeRow>>,
    cancel: CancellationToken,
}

impl MockRowStore {
    pub fn new() -> Arc<Self> {
        let (changes_tx, _) = broadcast::channel(64);
        Arc::new(Self {
            inserts: Mutex::new(Vec::new()),
            selects: Mutex::new(HashMap::new()),
            failing_selects: Mutex::new(HashSet::new()),
            fail_inserts: AtomicBool::new(false),
            changes_tx,
            cancel: CancellationToken::new(),
        })
    }

    pub fn seed_select(&self, table: &str, rows: Vec<serde_json::Value>) {
        self.selects.lock().unwrap().insert(table.to_owned(), rows);
    }

    pub fn fail_select(&self, table: &str) {
        self.failing_selects.lock().unwrap().insert(table.to_owned());
    }

    pub fn set_fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn inserts(&self) -> Vec<(String, serde_json::Value)> {
        self.inserts.lock().unwrap().clone()
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.lock().unwrap().len()
    }

    /// Emit a change notification to every open subscription.
    pub fn push_change(&self, table: &str, kind: ChangeKind, row: serde_json::Value) {
        let _ = self.changes_tx.send(Arc::new(ChangeRow {
            table: table.to_owned(),
            kind,
            row,
        }));
    }

    /// Number of receivers currently attached to the change channel.
    pub fn subscriber_count(&self) -> usize {
        self.changes_tx.receiver_count()
    }
}

impl RowStore for MockRowStore {
    async fn insert(&self, table: &str, row: serde_json::Value) -> Result<(), Error> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(Error::Api {
                message: "permission denied for table".into(),
                code: Some("42501".into()),
                status: 401,
            });
        }
        self.inserts.lock().unwrap().push((table.to_owned(), row));
        Ok(())
    }

    async fn select_all(&self, table: &str) -> Result<Vec<serde_json::Value>, Error> {
        if self.failing_selects.lock().unwrap().contains(table) {
            return Err(Error::Api {
                message: "relation unavailable".into(),
                code: Some("42P01".into()),
                status: 500,
            });
        }
        Ok(self
            .selects
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default())
    }

    fn subscribe(&self, table: &str, kind: ChangeKind) -> SubscriptionHandle {
        SubscriptionHandle::new(
            table.to_owned(),
            kind,
            self.changes_tx.subscribe(),
            self.cancel.child_token(),
        )
    }
}

// ── Mock position source ────────────────────────────────────────────

/// Position source fed by the test through mpsc senders, one per watch.
pub struct MockPositionSource {
    rxs: Mutex<VecDeque<mpsc::Receiver<Result<PositionFix, PositionError>>>>,
}

impl MockPositionSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            rxs: Mutex::new(VecDeque::new()),
        })
    }

    /// Queue one watch session; returns the sender that feeds it.
    pub fn push_watch(&self) -> mpsc::Sender<Result<PositionFix, PositionError>> {
        let (tx, rx) = mpsc::channel(32);
        self.rxs.lock().unwrap().push_back(rx);
        tx
    }

    /// Source plus the sender for its first watch.
    pub fn channel() -> (
        Arc<Self>,
        mpsc::Sender<Result<PositionFix, PositionError>>,
    ) {
        let source = Self::new();
        let tx = source.push_watch();
        (source, tx)
    }
}

impl PositionSource for MockPositionSource {
    fn watch(&self, _options: WatchOptions) -> mpsc::Receiver<Result<PositionFix, PositionError>> {
        self.rxs
            .lock()
            .unwrap()
            .pop_front()
            .expect("no watch session queued on mock position source")
    }
}

pub fn fix(lat: f64, lng: f64, speed: Option<f64>) -> PositionFix {
    PositionFix { lat, lng, speed }
}

/// Poll until `predicate` holds or the deadline passes. The millisecond
/// sleep keeps this usable under a paused clock (auto-advance kicks in
/// once the runtime is otherwise idle).
pub async fn wait_until(deadline: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let start = tokio::time::Instant::now();
    loop {
        if predicate() {
            return true;
        }
        if start.elapsed() >= deadline {
            return predicate();
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
}

/// Let spawned tasks run without advancing the clock.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}
