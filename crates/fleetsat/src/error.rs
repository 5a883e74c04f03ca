//! CLI error types with miette diagnostics.
//!
//! Maps core and store errors into user-facing errors with actionable
//! help text.

use miette::Diagnostic;
use thiserror::Error;

use fleetsat_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("No row service URL configured")]
    #[diagnostic(
        code(fleetsat::no_url),
        help("Pass --url or set the FLEETSAT_URL environment variable.")
    )]
    MissingUrl,

    #[error("No API key configured")]
    #[diagnostic(
        code(fleetsat::no_api_key),
        help("Pass --api-key or set the FLEETSAT_API_KEY environment variable.")
    )]
    MissingApiKey,

    #[error("No operator identity configured")]
    #[diagnostic(
        code(fleetsat::no_user),
        help("Pass --user or set the FLEETSAT_USER environment variable.")
    )]
    MissingUser,

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fleetsat::validation))]
    Validation { field: String, reason: String },

    // ── Service ──────────────────────────────────────────────────────

    #[error("Could not reach the row service")]
    #[diagnostic(
        code(fleetsat::connection_failed),
        help("Check that the service URL is correct and reachable.")
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Service rejected the request ({code}): {message}")]
    #[diagnostic(
        code(fleetsat::service_error),
        help("Verify your API key and that the table policies allow this operation.")
    )]
    ServiceError { code: String, message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(fleetsat::timeout),
        help("Increase the timeout with --timeout or check service responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Positioning ──────────────────────────────────────────────────

    #[error("Positioning failed: {message}")]
    #[diagnostic(
        code(fleetsat::positioning),
        help("Tracking ended; restart with `fleetsat track` once a fix is available.")
    )]
    Positioning { message: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(fleetsat::json), help("Check the --details JSON and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::MissingApiKey | Self::MissingUser => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::MissingUrl | Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Positioning { message } => Self::Positioning { message },

            CoreError::StoreWrite { code, message } => Self::ServiceError {
                code: code.unwrap_or_else(|| "write_failed".into()),
                message,
            },

            CoreError::StoreFetch { message } => Self::ServiceError {
                code: "fetch_failed".into(),
                message,
            },

            CoreError::Validation { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => Self::ServiceError {
                code: "internal".into(),
                message,
            },
        }
    }
}

impl From<fleetsat_store::Error> for CliError {
    fn from(err: fleetsat_store::Error) -> Self {
        match err {
            fleetsat_store::Error::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            fleetsat_store::Error::Api { message, code, .. } => Self::ServiceError {
                code: code.unwrap_or_default(),
                message,
            },
            fleetsat_store::Error::InvalidUrl(e) => Self::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
            other => Self::ConnectionFailed {
                source: other.into(),
            },
        }
    }
}
