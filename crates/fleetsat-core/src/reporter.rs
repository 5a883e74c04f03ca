// ── Throttled location reporter ──
//
// Runs on the tracking device: converts a continuous stream of position
// fixes into rate-limited, durable location writes, surfacing transport
// failures immediately and distinctly from GPS failures.
//
// The throttle gate is the one place an explicit rate invariant lives:
// writes for a vehicle are spaced at least MIN_SEND_INTERVAL apart,
// measured from the last *successful* write. A failed write does not
// advance the gate, so the next eligible fix retries; attempts stay
// fix-driven, so a failing endpoint is never hammered in a tight loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::position::{PositionError, PositionFix, PositionSource, WatchOptions};
use crate::rowstore::{RowStore, tables};

/// Minimum spacing between successful location writes for one vehicle.
pub const MIN_SEND_INTERVAL: Duration = Duration::from_millis(10_000);

// ── Observable state ─────────────────────────────────────────────────

/// Reporter lifecycle, observable through a `watch` channel.
///
/// `Failed` is terminal until [`LocationReporter::start`] is invoked
/// again; `Stopped` is the unconditional result of
/// [`LocationReporter::stop`].
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerStatus {
    Idle,
    /// The position watch is being established.
    Requesting,
    /// The watch is live; fixes flow (or are awaited) and eligible ones
    /// are written out.
    Tracking,
    /// A write is in flight.
    Sending,
    /// Last write landed; `at` is shown to the operator.
    Sent { at: DateTime<Utc> },
    /// The positioning service denied, errored, or timed out.
    Failed { message: String },
    Stopped,
}

/// A failed location write, surfaced to the operator verbatim.
///
/// Kept on a channel separate from [`TrackerStatus`]: a write failure is
/// recoverable and tracking continues, so it must not mask the tracking
/// state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub code: Option<String>,
    pub message: String,
    pub at: DateTime<Utc>,
}

// ── Reporter ─────────────────────────────────────────────────────────

/// Samples a position source and reports throttled location rows.
pub struct LocationReporter<R, P> {
    rows: Arc<R>,
    positions: Arc<P>,
    options: WatchOptions,
    status_tx: watch::Sender<TrackerStatus>,
    write_error_tx: watch::Sender<Option<WriteFailure>>,
    session: Mutex<Option<Session>>,
}

struct Session {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl<R: RowStore, P: PositionSource> LocationReporter<R, P> {
    pub fn new(rows: Arc<R>, positions: Arc<P>) -> Self {
        Self::with_options(rows, positions, WatchOptions::default())
    }

    pub fn with_options(rows: Arc<R>, positions: Arc<P>, options: WatchOptions) -> Self {
        let (status_tx, _) = watch::channel(TrackerStatus::Idle);
        let (write_error_tx, _) = watch::channel(None);
        Self {
            rows,
            positions,
            options,
            status_tx,
            write_error_tx,
            session: Mutex::new(None),
        }
    }

    /// Begin tracking `vehicle_id`.
    ///
    /// The identifier is trimmed and uppercased before use. Restarting
    /// replaces any running session, including one in the `Failed` state.
    pub async fn start(&self, vehicle_id: &str) -> Result<(), CoreError> {
        let vehicle_id = vehicle_id.trim().to_uppercase();
        if vehicle_id.is_empty() {
            return Err(CoreError::Validation {
                message: "vehicle identifier is empty".into(),
            });
        }

        let mut session = self.session.lock().await;
        if let Some(prior) = session.take() {
            prior.cancel.cancel();
            let _ = prior.task.await;
        }

        self.write_error_tx.send_replace(None);
        self.status_tx.send_replace(TrackerStatus::Requesting);
        debug!(vehicle_id, "starting position watch");

        let fixes = self.positions.watch(self.options);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_session(
            Arc::clone(&self.rows),
            vehicle_id,
            fixes,
            self.options.timeout,
            self.status_tx.clone(),
            self.write_error_tx.clone(),
            cancel.clone(),
        ));

        *session = Some(Session { cancel, task });
        Ok(())
    }

    /// Stop tracking.
    ///
    /// Idempotent: safe to call repeatedly or when never started. Always
    /// leaves the status at `Stopped`, regardless of prior error state.
    pub async fn stop(&self) {
        let mut session = self.session.lock().await;
        if let Some(prior) = session.take() {
            prior.cancel.cancel();
            let _ = prior.task.await;
        }
        self.status_tx.send_replace(TrackerStatus::Stopped);
    }

    /// Subscribe to status transitions.
    pub fn status(&self) -> watch::Receiver<TrackerStatus> {
        self.status_tx.subscribe()
    }

    /// The current status.
    pub fn current_status(&self) -> TrackerStatus {
        self.status_tx.borrow().clone()
    }

    /// Subscribe to write failures (cleared on every `start`).
    pub fn write_errors(&self) -> watch::Receiver<Option<WriteFailure>> {
        self.write_error_tx.subscribe()
    }
}

// ── Session task ─────────────────────────────────────────────────────

async fn run_session<R: RowStore>(
    rows: Arc<R>,
    vehicle_id: String,
    mut fixes: tokio::sync::mpsc::Receiver<Result<PositionFix, PositionError>>,
    first_fix_timeout: Duration,
    status_tx: watch::Sender<TrackerStatus>,
    write_error_tx: watch::Sender<Option<WriteFailure>>,
    cancel: CancellationToken,
) {
    let mut last_success: Option<Instant> = None;

    // The watch is live as soon as the source hands over its channel;
    // the first fix may still take a while.
    status_tx.send_replace(TrackerStatus::Tracking);

    // Bounded wait for the first fix; stale cached fixes are the
    // source's concern (max_age zero in WatchOptions).
    let first = tokio::select! {
        biased;
        () = cancel.cancelled() => return,
        first = tokio::time::timeout(first_fix_timeout, fixes.recv()) => first,
    };

    let mut next = match first {
        Ok(msg) => msg,
        Err(_elapsed) => {
            status_tx.send_replace(TrackerStatus::Failed {
                message: PositionError::Timeout.to_string(),
            });
            return;
        }
    };

    loop {
        match next {
            Some(Ok(fix)) => {
                handle_fix(
                    &rows,
                    &vehicle_id,
                    fix,
                    &mut last_success,
                    &status_tx,
                    &write_error_tx,
                )
                .await;
            }
            Some(Err(e)) => {
                warn!(vehicle_id, error = %e, "position watch failed");
                status_tx.send_replace(TrackerStatus::Failed {
                    message: e.to_string(),
                });
                return;
            }
            None => {
                // The source ended the watch without an error frame.
                status_tx.send_replace(TrackerStatus::Failed {
                    message: "position watch ended unexpectedly".into(),
                });
                return;
            }
        }

        next = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            next = fixes.recv() => next,
        };
    }
}

/// Apply the throttle gate to one fix and perform the write if eligible.
async fn handle_fix<R: RowStore>(
    rows: &Arc<R>,
    vehicle_id: &str,
    fix: PositionFix,
    last_success: &mut Option<Instant>,
    status_tx: &watch::Sender<TrackerStatus>,
    write_error_tx: &watch::Sender<Option<WriteFailure>>,
) {
    let now = Instant::now();
    let eligible = last_success.is_none_or(|t| now.duration_since(t) >= MIN_SEND_INTERVAL);

    if !eligible {
        // Within the quiet interval — keep tracking, skip the write.
        return;
    }

    status_tx.send_replace(TrackerStatus::Sending);

    // Absence of speed must not block a write.
    let row = json!({
        "vehicle_id": vehicle_id,
        "lat": fix.lat,
        "lng": fix.lng,
        "speed": fix.speed.unwrap_or(0.0),
    });

    match rows.insert(tables::VEHICLE_LOCATIONS, row).await {
        Ok(()) => {
            *last_success = Some(now);
            status_tx.send_replace(TrackerStatus::Sent { at: Utc::now() });
        }
        Err(e) => {
            warn!(vehicle_id, error = %e, "location write failed");
            write_error_tx.send_replace(Some(WriteFailure {
                code: e.code().map(str::to_owned),
                message: e.to_string(),
                at: Utc::now(),
            }));
            // last_success untouched: the next eligible fix retries.
            status_tx.send_replace(TrackerStatus::Tracking);
        }
    }
}
