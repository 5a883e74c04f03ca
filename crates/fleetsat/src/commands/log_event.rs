//! `fleetsat log-event` — one-shot security event write.

use std::str::FromStr;

use fleetsat_core::{FleetClient, SecurityEventType, Severity, UserProfile};
use fleetsat_store::RowStoreClient;

use crate::cli::{GlobalOpts, LogEventArgs};
use crate::error::CliError;

pub async fn handle(args: LogEventArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let user = super::require_user(global)?;

    let event_type =
        SecurityEventType::from_str(&args.event_type).map_err(|_| CliError::Validation {
            field: "type".into(),
            reason: format!(
                "unknown event type '{}' (expected SOS, geofence_breach, tamper, fatigue_warning)",
                args.event_type
            ),
        })?;

    let severity = Severity::from_str(&args.severity).map_err(|_| CliError::Validation {
        field: "severity".into(),
        reason: format!(
            "unknown severity '{}' (expected low, medium, high, critical)",
            args.severity
        ),
    })?;

    let details = match args.details.as_deref() {
        Some(raw) => serde_json::from_str(raw)?,
        None => serde_json::json!({}),
    };

    let mut config = super::build_store_config(global)?;
    config.realtime_enabled = false;

    let rows = RowStoreClient::connect(config)?;
    let client = FleetClient::new(rows);
    client.sign_in(UserProfile::new(user));

    client
        .log_security_event(event_type, severity, details, args.vehicle.as_deref())
        .await?;

    println!("security event recorded ({severity} {event_type})");
    Ok(())
}
