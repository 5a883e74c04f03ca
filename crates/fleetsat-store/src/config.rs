// ── Runtime connection configuration ──
//
// Describes *how* to reach the row service. Carries credential data and
// connection tuning, but never touches disk — the CLI constructs a
// `StoreConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::realtime::ReconnectConfig;

/// Configuration for connecting to a single row service.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Service base URL (e.g. `https://rows.example.com`).
    pub url: Url,
    /// Service API key.
    pub api_key: SecretString,
    /// Request timeout for REST calls.
    pub timeout: Duration,
    /// Reconnect behavior for the realtime feed.
    pub reconnect: ReconnectConfig,
    /// Enable the realtime change feed. Disable for one-shot writers
    /// that never subscribe (e.g. the tracking device).
    pub realtime_enabled: bool,
}

impl StoreConfig {
    pub fn new(url: Url, api_key: SecretString) -> Self {
        Self {
            url,
            api_key,
            timeout: Duration::from_secs(30),
            reconnect: ReconnectConfig::default(),
            realtime_enabled: true,
        }
    }

    /// REST endpoint for a table: `{base}/rest/v1/{table}`.
    pub(crate) fn table_url(&self, table: &str) -> Result<Url, crate::Error> {
        let base = self.url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/rest/v1/{table}"))?)
    }

    /// WebSocket endpoint for the realtime change feed.
    ///
    /// Derived from the base URL with the scheme switched to ws(s).
    pub(crate) fn realtime_url(&self) -> Result<Url, crate::Error> {
        let mut url = self.url.clone();
        let scheme = match url.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|()| crate::Error::WebSocketConnect("cannot derive ws scheme".into()))?;
        let base = url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/realtime/v1/websocket"))?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config(base: &str) -> StoreConfig {
        StoreConfig::new(base.parse().unwrap(), SecretString::from("key".to_owned()))
    }

    #[test]
    fn table_url_joins_rest_path() {
        let cfg = config("https://rows.example.com");
        assert_eq!(
            cfg.table_url("vehicles").unwrap().as_str(),
            "https://rows.example.com/rest/v1/vehicles"
        );
    }

    #[test]
    fn table_url_tolerates_trailing_slash() {
        let cfg = config("https://rows.example.com/");
        assert_eq!(
            cfg.table_url("companies").unwrap().as_str(),
            "https://rows.example.com/rest/v1/companies"
        );
    }

    #[test]
    fn realtime_url_switches_scheme() {
        let cfg = config("https://rows.example.com");
        assert_eq!(
            cfg.realtime_url().unwrap().as_str(),
            "wss://rows.example.com/realtime/v1/websocket"
        );

        let cfg = config("http://localhost:4000");
        assert_eq!(
            cfg.realtime_url().unwrap().as_str(),
            "ws://localhost:4000/realtime/v1/websocket"
        );
    }
}
