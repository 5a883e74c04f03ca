// ── Vehicle domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::GeoPoint;

/// Operational state reported by the fleet backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum VehicleStatus {
    Active,
    Idle,
    Maintenance,
    Offline,
    /// Forward-compatibility catch-all for statuses this client predates.
    #[serde(other)]
    Unknown,
}

/// A tracked fleet vehicle.
///
/// Exactly one `Vehicle` per id exists in the in-memory store. `location`
/// is `Some` only when both coordinates were present on the wire — the two
/// columns are read independently and never null-coalesced together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub plate: String,
    pub status: VehicleStatus,
    pub location: Option<GeoPoint>,
    /// km/h; 0 when the backend has no reading.
    pub speed: f64,
    /// Compass degrees; 0 when the backend has no reading.
    pub heading: f64,
    pub last_update: DateTime<Utc>,
    pub battery_level: f64,
    pub fatigue_level: f64,
    /// Partition key joining the vehicle to its company. No hard
    /// foreign-key linkage is enforced in memory.
    pub company_id: String,
}
