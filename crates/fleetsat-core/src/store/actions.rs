// ── State transition function ──
//
// The closed set of actions and the pure reducer over them. This is the
// only way domain state changes: callbacks never patch state directly,
// they dispatch actions that the store applies strictly in order.

use crate::convert::LocationUpdate;
use crate::model::{Alert, Company, GeoPoint, SecurityEvent, Vehicle};

use super::state::DomainState;

/// Everything that can happen to the domain state.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replace the vehicle collection wholesale; clears the loading flag.
    SetVehicles(Vec<Vehicle>),
    /// Replace the single matching-id vehicle. No-op if the id is absent
    /// (tolerates update-before-snapshot races).
    UpdateVehicle(Vehicle),
    /// Patch only the location of the matching vehicle; all other fields
    /// untouched. No-op if the id is absent.
    UpdateVehicleLocation { id: String, update: LocationUpdate },
    /// Prepend a locally raised alert.
    AddAlert(Alert),
    /// Prepend an observed security event. When the severity is alertable,
    /// the derived [`Alert`] is synthesized inside this transition, so
    /// ingestion stays one action per notification.
    AddSecurityEvent(SecurityEvent),
    SetSecurityEvents(Vec<SecurityEvent>),
    SetCompanies(Vec<Company>),
    SetSelectedCompany(Option<String>),
    SetLoading(bool),
}

/// Apply one action to the state, producing the next state.
///
/// Pure: the input state is never mutated, and identical inputs always
/// produce identical outputs.
pub fn reduce(state: &DomainState, action: Action) -> DomainState {
    let mut next = state.clone();

    match action {
        Action::SetVehicles(vehicles) => {
            next.vehicles = vehicles;
            next.is_loading = false;
        }

        Action::UpdateVehicle(vehicle) => {
            if let Some(slot) = next.vehicles.iter_mut().find(|v| v.id == vehicle.id) {
                *slot = vehicle;
            }
        }

        Action::UpdateVehicleLocation { id, update } => {
            if let Some(vehicle) = next.vehicles.iter_mut().find(|v| v.id == id) {
                vehicle.location = Some(GeoPoint::new(update.lat, update.lng));
            }
        }

        Action::AddAlert(alert) => {
            next.alerts.insert(0, alert);
        }

        Action::AddSecurityEvent(event) => {
            if event.severity.is_alertable() {
                next.alerts.insert(0, Alert::from_event(&event));
            }
            next.security_events.insert(0, event);
        }

        Action::SetSecurityEvents(events) => {
            next.security_events = events;
        }

        Action::SetCompanies(companies) => {
            next.companies = companies;
        }

        Action::SetSelectedCompany(id) => {
            next.selected_company_id = id;
        }

        Action::SetLoading(loading) => {
            next.is_loading = loading;
        }
    }

    next
}

// ── Tests ──────────────────────────────────────────────────────────
