// ── Core error types ──
//
// User-facing errors from fleetsat-core. Transport details stay in
// `fleetsat_store::Error`; the `From` impl translates them into
// domain-appropriate variants. Two failure modes are deliberately NOT
// here: malformed change notifications (dropped at the subscription
// callback) and security-event logging without an identity (a silent
// no-op).

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The positioning service denied access, errored, or timed out.
    /// Fatal to the current tracking session; requires an explicit restart.
    #[error("Positioning error: {message}")]
    Positioning { message: String },

    /// A row insert failed. Recoverable: the reporter retries on the next
    /// eligible tick, and the code/message are surfaced to the operator.
    #[error("Store write failed{}: {message}", fmt_code(code.as_deref()))]
    StoreWrite {
        code: Option<String>,
        message: String,
    },

    /// A snapshot fetch failed. Logged; the dashboard proceeds with an
    /// empty or partial collection instead of blocking.
    #[error("Store fetch failed: {message}")]
    StoreFetch { message: String },

    /// Caller-supplied input was rejected before any I/O.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn fmt_code(code: Option<&str>) -> String {
    code.map(|c| format!(" ({c})")).unwrap_or_default()
}

impl CoreError {
    /// Wrap a store error from a write path, keeping the service code.
    pub(crate) fn store_write(err: &fleetsat_store::Error) -> Self {
        Self::StoreWrite {
            code: err.code().map(str::to_owned),
            message: err.to_string(),
        }
    }

    /// Wrap a store error from a snapshot fetch.
    pub(crate) fn store_fetch(err: &fleetsat_store::Error) -> Self {
        Self::StoreFetch {
            message: err.to_string(),
        }
    }
}

impl From<fleetsat_store::Error> for CoreError {
    fn from(err: fleetsat_store::Error) -> Self {
        match err {
            fleetsat_store::Error::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            other => Self::Internal(other.to_string()),
        }
    }
}
