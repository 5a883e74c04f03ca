// ── Wire-row to domain type conversions ──
//
// Bridges raw row-store JSON (snake_case columns) into canonical
// `fleetsat_core::model` domain types. One mapping per table, applied
// identically whether the row came from the initial snapshot fetch or a
// realtime change notification.
//
// Rows missing required fields are *malformed*: mapping returns `None`,
// the caller drops the row without dispatching. This is expected to be
// transient (the server may notify while still assembling a record), so
// it is logged at trace level only.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::trace;

use crate::model::{
    GeoPoint, SecurityEvent, SecurityEventType, Severity, Vehicle, VehicleStatus,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse an ISO-8601 datetime string into `DateTime<Utc>`.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ── Vehicle ────────────────────────────────────────────────────────

/// `vehicles` row as stored on the wire.
#[derive(Debug, Deserialize)]
struct VehicleRow {
    id: String,
    plate: String,
    status: VehicleStatus,
    lat: Option<f64>,
    lng: Option<f64>,
    speed: Option<f64>,
    heading: Option<f64>,
    last_update: String,
    battery_level: Option<f64>,
    fatigue_level: Option<f64>,
    company_id: String,
}

/// Map a `vehicles` row to a [`Vehicle`], or `None` if malformed.
///
/// `lat` and `lng` are read as two independent columns; the location is
/// populated only when both are present. `speed`/`heading` and the
/// battery/fatigue gauges default to 0 when absent.
pub fn map_vehicle_row(row: &serde_json::Value) -> Option<Vehicle> {
    let row: VehicleRow = match serde_json::from_value(row.clone()) {
        Ok(r) => r,
        Err(e) => {
            trace!(error = %e, "dropping malformed vehicle row");
            return None;
        }
    };

    let Some(last_update) = parse_datetime(&row.last_update) else {
        trace!(id = %row.id, raw = %row.last_update, "dropping vehicle row with bad timestamp");
        return None;
    };

    let location = match (row.lat, row.lng) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
        _ => None,
    };

    Some(Vehicle {
        id: row.id,
        plate: row.plate,
        status: row.status,
        location,
        speed: row.speed.unwrap_or(0.0),
        heading: row.heading.unwrap_or(0.0),
        last_update,
        battery_level: row.battery_level.unwrap_or(0.0),
        fatigue_level: row.fatigue_level.unwrap_or(0.0),
        company_id: row.company_id,
    })
}

// ── Location sample ────────────────────────────────────────────────

/// The fields of a `vehicle_locations` insert the dashboard consumes.
///
/// Write-only from the reporter's perspective; on the read side only the
/// owning vehicle's location is patched, nothing is retained.
#[derive(Debug, Clone, Copy)]
pub struct LocationUpdate {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    vehicle_id: String,
    lat: f64,
    lng: f64,
}

/// Map a `vehicle_locations` row to `(vehicle_id, LocationUpdate)`,
/// or `None` if any required field is missing.
pub fn map_location_row(row: &serde_json::Value) -> Option<(String, LocationUpdate)> {
    let row: LocationRow = match serde_json::from_value(row.clone()) {
        Ok(r) => r,
        Err(e) => {
            trace!(error = %e, "dropping malformed location row");
            return None;
        }
    };

    Some((
        row.vehicle_id,
        LocationUpdate {
            lat: row.lat,
            lng: row.lng,
        },
    ))
}

// ── Security event ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SecurityEventRow {
    id: String,
    user_id: String,
    vehicle_id: Option<String>,
    #[serde(rename = "type")]
    event_type: SecurityEventType,
    severity: Severity,
    location: Option<GeoPoint>,
    timestamp: String,
    legal_hash: String,
    #[serde(default)]
    details: serde_json::Value,
}

/// Map a `security_events` row to a [`SecurityEvent`], or `None` if malformed.
///
/// Rows observed through the store are marked `verified` — they carry a
/// server-assigned id and the legal hash that was committed with them.
pub fn map_security_event_row(row: &serde_json::Value) -> Option<SecurityEvent> {
    let row: SecurityEventRow = match serde_json::from_value(row.clone()) {
        Ok(r) => r,
        Err(e) => {
            trace!(error = %e, "dropping malformed security event row");
            return None;
        }
    };

    let Some(timestamp) = parse_datetime(&row.timestamp) else {
        trace!(id = %row.id, raw = %row.timestamp, "dropping security event with bad timestamp");
        return None;
    };

    Some(SecurityEvent {
        id: row.id,
        user_id: row.user_id,
        vehicle_id: row.vehicle_id,
        event_type: row.event_type,
        severity: row.severity,
        location: row.location,
        timestamp,
        legal_hash: row.legal_hash,
        details: row.details,
        verified: true,
    })
}

// ── Tests ──────────────────────────────────────────────────────────
