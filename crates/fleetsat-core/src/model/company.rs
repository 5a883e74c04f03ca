// ── Company domain type ──

use serde::{Deserialize, Serialize};

/// A fleet operator. Used purely as a partition key for vehicles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub name: String,
}
