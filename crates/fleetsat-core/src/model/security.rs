// ── Security event and alert domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::GeoPoint;

/// Category of a reported security event.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum SecurityEventType {
    /// Driver-triggered panic. Uppercase on the wire for historical reasons.
    #[serde(rename = "SOS")]
    #[strum(serialize = "SOS")]
    Sos,
    GeofenceBreach,
    Tamper,
    FatigueWarning,
    #[serde(other)]
    Unknown,
}

/// Severity scale shared by events and derived alerts.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Whether an event at this severity synthesizes a dashboard alert.
    pub fn is_alertable(self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

/// A durable security event, immutable once created.
///
/// `legal_hash` is the client-computed tamper-evident digest of the event
/// payload, written alongside the row so the record can later be checked
/// for in-transit or at-rest alteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub id: String,
    pub user_id: String,
    pub vehicle_id: Option<String>,
    pub event_type: SecurityEventType,
    pub severity: Severity,
    pub location: Option<GeoPoint>,
    pub timestamp: DateTime<Utc>,
    pub legal_hash: String,
    /// Opaque structured payload supplied by the reporter.
    pub details: serde_json::Value,
    pub verified: bool,
}

/// Kind of a derived dashboard alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertType {
    Sos,
    Geofence,
}

/// Ephemeral alert derived from a high/critical security event.
///
/// Never persisted — it exists only in the dashboard's in-memory view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Deterministic: `alert-{security_event_id}`.
    pub id: String,
    pub vehicle_id: String,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub resolved: bool,
}

impl Alert {
    /// Derive the alert for an alertable security event.
    pub fn from_event(event: &SecurityEvent) -> Self {
        Self {
            id: format!("alert-{}", event.id),
            vehicle_id: event
                .vehicle_id
                .clone()
                .unwrap_or_else(|| "unknown".to_owned()),
            alert_type: match event.event_type {
                SecurityEventType::Sos => AlertType::Sos,
                _ => AlertType::Geofence,
            },
            severity: event.severity,
            timestamp: event.timestamp,
            resolved: false,
        }
    }
}
