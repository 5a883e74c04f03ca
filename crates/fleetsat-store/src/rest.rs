// REST row client
//
// Wraps `reqwest::Client` with table URL construction and service error
// parsing. The service speaks a PostgREST-style dialect: rows in, rows out,
// errors as `{ code, message }` JSON bodies.

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::config::StoreConfig;
use crate::error::Error;
use crate::realtime::{ChangeKind, RealtimeFeed, SubscriptionHandle};
use crate::transport::TransportConfig;

/// Error body the row service returns on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Async client for the row service: REST rows plus the realtime change feed.
pub struct RowStoreClient {
    http: reqwest::Client,
    config: StoreConfig,
    realtime: Option<RealtimeFeed>,
    cancel: CancellationToken,
}

impl RowStoreClient {
    /// Build a client from a [`StoreConfig`].
    ///
    /// When realtime is enabled, the change-feed task is spawned
    /// immediately; it connects (and reconnects) in the background.
    pub fn connect(config: StoreConfig) -> Result<Self, Error> {
        let transport = TransportConfig {
            timeout: config.timeout,
            api_key: Some(config.api_key.clone()),
        };
        let http = transport.build_client()?;
        let cancel = CancellationToken::new();

        let realtime = if config.realtime_enabled {
            let ws_url = config.realtime_url()?;
            Some(RealtimeFeed::connect(
                ws_url,
                config.reconnect.clone(),
                cancel.child_token(),
            ))
        } else {
            None
        };

        Ok(Self {
            http,
            config,
            realtime,
            cancel,
        })
    }

    /// Build a client against an arbitrary base URL with a pre-built
    /// `reqwest::Client` and no realtime feed. Used by tests.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let url: Url = base_url.parse()?;
        let config = StoreConfig {
            realtime_enabled: false,
            ..StoreConfig::new(url, secrecy::SecretString::from(String::new()))
        };
        Ok(Self {
            http,
            config,
            realtime: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Insert one row into `table`.
    ///
    /// `POST {base}/rest/v1/{table}` with `Prefer: return=minimal` — the
    /// service assigns ids and timestamps; the caller reads them back only
    /// via change notifications.
    pub async fn insert(&self, table: &str, row: serde_json::Value) -> Result<(), Error> {
        let url = self.config.table_url(table)?;
        debug!(table, "POST {url}");

        let resp = self
            .http
            .post(url)
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        Err(parse_api_error(status, resp).await)
    }

    /// Select all rows from `table`.
    ///
    /// `GET {base}/rest/v1/{table}?select=*`
    pub async fn select_all(&self, table: &str) -> Result<Vec<serde_json::Value>, Error> {
        let mut url = self.config.table_url(table)?;
        url.set_query(Some("select=*"));
        debug!(table, "GET {url}");

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(parse_api_error(status, resp).await);
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Open a change subscription for `(table, kind)`.
    ///
    /// When realtime is disabled, returns an already-closed handle whose
    /// `recv()` immediately yields `None`.
    pub fn subscribe(&self, table: &str, kind: ChangeKind) -> SubscriptionHandle {
        match self.realtime {
            Some(ref feed) => feed.subscribe(table, kind),
            None => {
                let (_, rx) = tokio::sync::broadcast::channel(1);
                let cancel = CancellationToken::new();
                cancel.cancel();
                SubscriptionHandle::new(table.to_owned(), kind, rx, cancel)
            }
        }
    }

    /// Shut down the realtime feed and all of its subscriptions.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(ref feed) = self.realtime {
            feed.shutdown();
        }
    }
}

/// Parse a non-2xx response into [`Error::Api`], keeping the service's
/// code and message when the body is structured, and falling back to the
/// raw body text otherwise.
async fn parse_api_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    let body = resp.text().await.unwrap_or_default();

    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) if parsed.message.is_some() || parsed.code.is_some() => Error::Api {
            message: parsed
                .message
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            code: parsed.code,
            status: status.as_u16(),
        },
        _ => Error::Api {
            message: if body.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                body
            },
            code: None,
            status: status.as_u16(),
        },
    }
}
