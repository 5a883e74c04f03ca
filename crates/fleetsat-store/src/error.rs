use thiserror::Error;

/// Top-level error type for the `fleetsat-store` crate.
///
/// Covers every failure mode of the row service: HTTP transport, the REST
/// row API, and the realtime WebSocket feed. `fleetsat-core` maps these
/// into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Row API ─────────────────────────────────────────────────────
    /// Structured error returned by the row service.
    #[error("Row store error (HTTP {status}): {message}")]
    Api {
        message: String,
        /// Service-specific error code (e.g. `"23505"` for a unique violation).
        code: Option<String>,
        status: u16,
    },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Realtime feed ───────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket closed unexpectedly.
    #[error("WebSocket closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::WebSocketConnect(_) => true,
            _ => false,
        }
    }

    /// Extract the service error code, if available.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_ws_connect_are_transient() {
        assert!(Error::Timeout { timeout_secs: 30 }.is_transient());
        assert!(Error::WebSocketConnect("refused".into()).is_transient());
        assert!(
            !Error::Api {
                message: "permission denied".into(),
                code: Some("42501".into()),
                status: 403,
            }
            .is_transient()
        );
    }

    #[test]
    fn code_only_from_api_errors() {
        let api = Error::Api {
            message: "dup".into(),
            code: Some("23505".into()),
            status: 409,
        };
        assert_eq!(api.code(), Some("23505"));
        assert_eq!(Error::Timeout { timeout_secs: 1 }.code(), None);
    }
}
