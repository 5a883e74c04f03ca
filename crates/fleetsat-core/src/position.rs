// ── Positioning service seam ──
//
// The device's GPS is consumed as a channel of fix results rather than a
// pair of callbacks: dropping the receiver cancels the watch, which makes
// reporter teardown a plain channel drop.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

/// One position reading from the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    pub lat: f64,
    pub lng: f64,
    /// m/s; `None` when the device cannot derive speed. Absence must not
    /// block a write — consumers default to 0.
    pub speed: Option<f64>,
}

/// Failures from the positioning service. All of them end the current
/// tracking session.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("position permission denied")]
    PermissionDenied,

    #[error("position unavailable: {message}")]
    Unavailable { message: String },

    #[error("timed out waiting for a position fix")]
    Timeout,
}

/// Options for a continuous position watch.
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    /// Request the device's high-accuracy mode.
    pub high_accuracy: bool,
    /// Bounded wait for the first fix.
    pub timeout: Duration,
    /// Maximum acceptable fix age. Zero means never serve a cached fix.
    pub max_age: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_age: Duration::ZERO,
        }
    }
}

/// A source of continuous position readings.
pub trait PositionSource: Send + Sync + 'static {
    /// Begin a continuous watch. The returned receiver yields fixes and
    /// errors until the source ends the watch or the receiver is dropped.
    fn watch(&self, options: WatchOptions) -> mpsc::Receiver<Result<PositionFix, PositionError>>;
}
