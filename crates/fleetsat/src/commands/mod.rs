//! Command handlers: bridge CLI args to the core client types.

pub mod log_event;
pub mod position;
pub mod track;
pub mod watch;

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use fleetsat_store::StoreConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Build a [`StoreConfig`] from the global flags / env vars.
pub fn build_store_config(global: &GlobalOpts) -> Result<StoreConfig, CliError> {
    let url_str = global.url.as_deref().ok_or(CliError::MissingUrl)?;
    let url: Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let api_key = global.api_key.as_deref().ok_or(CliError::MissingApiKey)?;

    let mut config = StoreConfig::new(url, SecretString::from(api_key.to_owned()));
    config.timeout = Duration::from_secs(global.timeout);
    Ok(config)
}

/// The operator identity, required for identity-gated commands.
pub fn require_user(global: &GlobalOpts) -> Result<&str, CliError> {
    global.user.as_deref().ok_or(CliError::MissingUser)
}
