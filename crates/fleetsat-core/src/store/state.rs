// ── Dashboard domain state ──

use serde::Serialize;

use crate::model::{Alert, Company, SecurityEvent, Vehicle};

/// The dashboard's single source of truth for fetched/observed entities.
///
/// Owned exclusively by the [`StateStore`](super::StateStore) reducer task;
/// consumers only ever see immutable snapshots. Holds no back-references
/// into UI state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainState {
    pub vehicles: Vec<Vehicle>,
    /// Most-recent-first.
    pub alerts: Vec<Alert>,
    /// Most-recent-first.
    pub security_events: Vec<SecurityEvent>,
    pub companies: Vec<Company>,
    /// Visibility filter; `None` shows the whole fleet.
    pub selected_company_id: Option<String>,
    pub is_loading: bool,
}

impl Default for DomainState {
    fn default() -> Self {
        Self {
            vehicles: Vec::new(),
            alerts: Vec::new(),
            security_events: Vec::new(),
            companies: Vec::new(),
            selected_company_id: None,
            is_loading: true,
        }
    }
}

impl DomainState {
    /// Vehicles visible under the current company selection.
    ///
    /// A pure projection recomputed on every read — never stored
    /// redundantly. Preserves the collection's relative order.
    pub fn filtered_vehicles(&self) -> Vec<&Vehicle> {
        match self.selected_company_id {
            Some(ref company_id) => self
                .vehicles
                .iter()
                .filter(|v| v.company_id == *company_id)
                .collect(),
            None => self.vehicles.iter().collect(),
        }
    }

    /// Look up a vehicle by id.
    pub fn vehicle(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Alerts not yet resolved, most recent first.
    pub fn active_alerts(&self) -> Vec<&Alert> {
        self.alerts.iter().filter(|a| !a.resolved).collect()
    }
}
