// ── Common types shared across the domain model ──

use serde::{Deserialize, Serialize};

/// A WGS-84 coordinate pair.
///
/// Always carries both components: entities expose `Option<GeoPoint>`
/// rather than half-populated coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}
