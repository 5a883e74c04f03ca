//! Realtime change-notification feed with auto-reconnect.
//!
//! Connects to the row service's WebSocket endpoint and streams parsed
//! row-change frames through a [`tokio::sync::broadcast`] channel. Handles
//! reconnection with exponential backoff + jitter automatically.
//!
//! Consumers open per-table subscriptions via [`RealtimeFeed::subscribe`];
//! filtering happens client-side, so the feed itself is a single socket no
//! matter how many subscriptions exist.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;

// ── Broadcast channel capacity ───────────────────────────────────────

const CHANGE_CHANNEL_CAPACITY: usize = 1024;

// ── Change events ────────────────────────────────────────────────────

/// Which kind of row change a subscription observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
}

/// A parsed row-change notification from the realtime feed.
#[derive(Debug, Clone)]
pub struct ChangeRow {
    /// Table the change belongs to.
    pub table: String,
    /// Insert or update.
    pub kind: ChangeKind,
    /// The new row, as sent by the service. May be partial while the
    /// server is still assembling the record — consumers validate.
    pub row: serde_json::Value,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for feed reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── RealtimeFeed ─────────────────────────────────────────────────────

/// Handle to a running realtime change feed.
///
/// Drop all subscriptions and call [`shutdown`](Self::shutdown) to tear
/// down the background task.
pub struct RealtimeFeed {
    change_tx: broadcast::Sender<Arc<ChangeRow>>,
    cancel: CancellationToken,
}

impl RealtimeFeed {
    /// Connect to the realtime endpoint and spawn the reconnection loop.
    ///
    /// Returns immediately once the background task is spawned. The first
    /// connection attempt happens asynchronously — open subscriptions to
    /// start consuming changes.
    pub fn connect(ws_url: Url, reconnect: ReconnectConfig, cancel: CancellationToken) -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        let task_tx = change_tx.clone();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            ws_loop(ws_url, task_tx, reconnect, task_cancel).await;
        });

        Self { change_tx, cancel }
    }

    /// Open a subscription for one `(table, kind)` pair.
    ///
    /// Multiple subscriptions can coexist; each gets its own broadcast
    /// receiver. If a consumer falls behind it skips lagged frames rather
    /// than failing.
    pub fn subscribe(&self, table: &str, kind: ChangeKind) -> SubscriptionHandle {
        SubscriptionHandle::new(
            table.to_owned(),
            kind,
            self.change_tx.subscribe(),
            self.cancel.child_token(),
        )
    }

    /// Signal the background task to shut down gracefully.
    ///
    /// Also closes every subscription opened from this feed.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── SubscriptionHandle ───────────────────────────────────────────────

/// A single `(table, kind)` change subscription.
///
/// Closing is idempotent: `close()` may be called any number of times,
/// including concurrently with a pending [`recv`](Self::recv), which then
/// resolves to `None`.
pub struct SubscriptionHandle {
    table: String,
    kind: ChangeKind,
    rx: broadcast::Receiver<Arc<ChangeRow>>,
    cancel: CancellationToken,
}

impl SubscriptionHandle {
    /// Build a handle from raw parts.
    ///
    /// Normally created via [`RealtimeFeed::subscribe`]; public so that
    /// in-process feeds (and tests) can synthesize subscriptions.
    pub fn new(
        table: String,
        kind: ChangeKind,
        rx: broadcast::Receiver<Arc<ChangeRow>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            table,
            kind,
            rx,
            cancel,
        }
    }

    /// Receive the next matching change, or `None` once the subscription
    /// is closed or the feed has shut down.
    pub async fn recv(&mut self) -> Option<Arc<ChangeRow>> {
        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => return None,
                result = self.rx.recv() => match result {
                    Ok(change) => {
                        if change.table == self.table && change.kind == self.kind {
                            return Some(change);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            table = %self.table,
                            skipped,
                            "subscription lagged, skipping change frames"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
            }
        }
    }

    /// Close this subscription. Safe to call on an already-closed handle.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether the subscription has been closed.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → on error, backoff → reconnect.
async fn ws_loop(
    ws_url: Url,
    change_tx: broadcast::Sender<Arc<ChangeRow>>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&ws_url, &change_tx, &cancel) => {
                match result {
                    // A clean close resets the attempt counter; the next
                    // connection is tried right away.
                    Ok(()) => {
                        tracing::info!("realtime feed disconnected cleanly, reconnecting");
                        attempt = 0;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, attempt, "realtime feed error");

                        if reconnect.max_retries.is_some_and(|max| attempt >= max) {
                            tracing::error!(
                                attempt,
                                "realtime reconnection limit reached, giving up"
                            );
                            break;
                        }

                        let delay = calculate_backoff(attempt, &reconnect);
                        tracing::info!(
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            attempt,
                            "backing off before next realtime connect"
                        );

                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(delay) => {}
                        }

                        attempt += 1;
                    }
                }
            }
        }
    }

    tracing::debug!("realtime feed loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish a single WebSocket connection, read frames until it drops.
async fn connect_and_read(
    url: &Url,
    change_tx: &broadcast::Sender<Arc<ChangeRow>>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to realtime feed");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::info!("realtime feed connected");

    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        parse_and_broadcast(&text, change_tx);
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // Pong replies are tungstenite's job.
                        tracing::trace!("realtime ping");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        let Some(cf) = frame else {
                            tracing::info!("realtime close frame received (no payload)");
                            return Ok(());
                        };
                        if cf.code == tungstenite::protocol::frame::coding::CloseCode::Normal {
                            tracing::info!(reason = %cf.reason, "realtime close frame received");
                            return Ok(());
                        }
                        // Abnormal close counts as an error so the loop backs off.
                        return Err(Error::WebSocketClosed {
                            code: cf.code.into(),
                            reason: cf.reason.to_string(),
                        });
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        // Peer went away with no close frame.
                        tracing::info!("realtime stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Binary, Pong, Frame — nothing to do.
                    }
                }
            }
        }
    }
}

// ── Frame parsing ────────────────────────────────────────────────────

/// Raw frame the service sends over the WebSocket:
/// `{ "table": "...", "kind": "insert" | "update", "new": { ... } }`.
#[derive(Debug, Deserialize)]
struct ChangeFrame {
    table: String,
    kind: ChangeKind,
    #[serde(rename = "new")]
    row: serde_json::Value,
}

/// Parse a WebSocket text frame and broadcast the change inside.
///
/// Frames that do not parse as change notifications (heartbeats, server
/// banners) are dropped with a trace log — the server may interleave them
/// freely.
fn parse_and_broadcast(text: &str, change_tx: &broadcast::Sender<Arc<ChangeRow>>) {
    let frame: ChangeFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            tracing::trace!(error = %e, "ignoring non-change realtime frame");
            return;
        }
    };

    // A send error only means nobody is subscribed at the moment.
    let _ = change_tx.send(Arc::new(ChangeRow {
        table: frame.table,
        kind: frame.kind,
        row: frame.row,
    }));
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Reconnect delay for the given attempt.
///
/// The base delay doubles per attempt until it hits `max_delay`, then a
/// ±20% spread keyed off the attempt number is applied so a fleet of
/// clients does not reconnect in lockstep.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
    let doubled = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exp);
    let capped = doubled.min(config.max_delay.as_secs_f64());

    // Pseudo-random spread derived from the attempt number; cheap, and
    // reproducible in tests.
    let spread = 0.2 * (f64::from(attempt) * 2.6).sin();
    Duration::from_secs_f64((capped * (1.0 + spread)).max(0.0))
}

// ── Tests ────────────────────────────────────────────────────────────
