// Shared transport configuration for building reqwest::Client instances.
//
// The REST client and the realtime feed share timeout and credential
// settings through this module, avoiding duplicated builder logic.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    /// Service API key, injected as `apikey` + `Authorization` headers.
    pub api_key: Option<SecretString>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            api_key: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent("fleetsat/0.1.0");

        if let Some(ref key) = self.api_key {
            builder = builder.default_headers(auth_headers(key)?);
        }

        builder.build().map_err(crate::error::Error::Transport)
    }
}

/// Build the `apikey` + `Authorization: Bearer` header pair the row
/// service expects on every request.
fn auth_headers(key: &SecretString) -> Result<HeaderMap, crate::error::Error> {
    let mut headers = HeaderMap::new();

    let mut apikey = HeaderValue::from_str(key.expose_secret())
        .map_err(|_| invalid_key())?;
    apikey.set_sensitive(true);

    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
        .map_err(|_| invalid_key())?;
    bearer.set_sensitive(true);

    headers.insert("apikey", apikey);
    headers.insert(reqwest::header::AUTHORIZATION, bearer);
    Ok(headers)
}

fn invalid_key() -> crate::error::Error {
    crate::error::Error::Api {
        message: "API key contains characters not valid in an HTTP header".into(),
        code: Some("invalid_api_key".into()),
        status: 0,
    }
}
