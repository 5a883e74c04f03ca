// ── Tamper-evident event hashing ──
//
// The legal hash is computed client-side, before the network write, over
// the client-asserted event payload — so the stored digest reflects what
// the device observed, not server-assigned fields. This protects against
// in-transit or at-rest alteration only; a malicious client can assert
// whatever it likes, including its own clock.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::CoreError;
use crate::model::{SecurityEventType, Severity};

/// The semantic content of a security event, in hashing order.
///
/// Field order is the canonical serialization order — changing it changes
/// every hash.
#[derive(Debug, Serialize)]
pub struct HashPayload<'a> {
    #[serde(rename = "type")]
    pub event_type: SecurityEventType,
    pub severity: Severity,
    pub vehicle_id: Option<&'a str>,
    pub details: &'a serde_json::Value,
    pub user_id: &'a str,
    /// ISO-8601, client clock.
    pub timestamp: String,
}

/// Produce the deterministic SHA-256 digest of an event payload as
/// lowercase hex (64 characters).
///
/// Pure and side-effect-free; a serialization failure aborts the event
/// write rather than persisting an unhashed record.
pub fn generate_hash(payload: &HashPayload<'_>) -> Result<String, CoreError> {
    let canonical = serde_json::to_vec(payload)
        .map_err(|e| CoreError::Internal(format!("event payload not serializable: {e}")))?;

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

// ── Tests ──────────────────────────────────────────────────────────
