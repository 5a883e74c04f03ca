// ── Session identity ──

use serde::{Deserialize, Serialize};

/// The signed-in operator.
///
/// External to the domain entities — identity gates their visibility but
/// is owned by the auth layer, not the state store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }
}
