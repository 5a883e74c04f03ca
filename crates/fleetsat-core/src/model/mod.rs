// ── Unified domain model ──
//
// Every type in this module is the canonical in-memory representation of a
// fleet entity. Wire rows (snake_case JSON) are mapped into these types by
// `convert`; the same mapping serves the snapshot fetch and the realtime
// change feed.

pub mod common;

pub mod company;
pub mod security;
pub mod user;
pub mod vehicle;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use fleetsat_core::model::*` gives you everything.

pub use common::GeoPoint;

pub use vehicle::{Vehicle, VehicleStatus};

pub use security::{Alert, AlertType, SecurityEvent, SecurityEventType, Severity};

pub use company::Company;

pub use user::UserProfile;
