#![allow(clippy::unwrap_used)]
// Integration tests for the identity-driven orchestration and the
// `FleetClient` facade, against an in-process row store.

mod common;

use std::time::Duration;

use serde_json::json;

use fleetsat_core::rowstore::tables;
use fleetsat_core::{FleetClient, SecurityEventType, Severity, UserProfile, VehicleStatus};
use fleetsat_store::ChangeKind;

use common::{MockRowStore, wait_until};

const WAIT: Duration = Duration::from_secs(2);

fn vehicle_row(id: &str, company: &str) -> serde_json::Value {
    json!({
        "id": id,
        "plate": format!("PL-{id}"),
        "status": "active",
        "lat": 9.9,
        "lng": -84.1,
        "speed": 10.0,
        "heading": 90.0,
        "last_update": "2026-08-20T12:00:00Z",
        "battery_level": 80.0,
        "fatigue_level": 5.0,
        "company_id": company,
    })
}

fn event_row(id: &str, severity: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": "u1",
        "vehicle_id": "v1",
        "type": "SOS",
        "severity": severity,
        "timestamp": "2026-08-20T12:05:00Z",
        "legal_hash": "deadbeef",
        "details": {},
    })
}

async fn signed_in_client(rows: &std::sync::Arc<MockRowStore>) -> FleetClient<MockRowStore> {
    let client = FleetClient::from_arc(rows.clone());
    client.start().await;
    client.sign_in(UserProfile::new("u1"));
    client
}

#[tokio::test]
async fn sign_in_fetches_snapshot_and_opens_subscriptions() {
    let rows = MockRowStore::new();
    rows.seed_select(
        tables::COMPANIES,
        vec![json!({"id": "c1", "name": "Acme Logistics"})],
    );
    rows.seed_select(
        tables::VEHICLES,
        vec![vehicle_row("v1", "c1"), vehicle_row("v2", "c2")],
    );

    let client = signed_in_client(&rows).await;

    assert!(
        wait_until(WAIT, || {
            let s = client.state();
            s.vehicles.len() == 2 && s.companies.len() == 1 && !s.is_loading
        })
        .await
    );
    assert!(
        wait_until(WAIT, || rows.subscriber_count() == 3).await,
        "expected three change subscriptions"
    );

    let state = client.state();
    assert_eq!(state.vehicles[0].status, VehicleStatus::Active);
    assert_eq!(state.companies[0].name, "Acme Logistics");

    client.shutdown().await;
}

#[tokio::test]
async fn vehicle_update_notification_replaces_the_row() {
    let rows = MockRowStore::new();
    rows.seed_select(tables::VEHICLES, vec![vehicle_row("v1", "c1")]);

    let client = signed_in_client(&rows).await;
    assert!(wait_until(WAIT, || rows.subscriber_count() == 3).await);

    let mut updated = vehicle_row("v1", "c1");
    updated["status"] = json!("maintenance");
    updated["speed"] = json!(0.0);
    rows.push_change(tables::VEHICLES, ChangeKind::Update, updated);

    assert!(
        wait_until(WAIT, || {
            client
                .state()
                .vehicle("v1")
                .is_some_and(|v| v.status == VehicleStatus::Maintenance)
        })
        .await
    );

    client.shutdown().await;
}

#[tokio::test]
async fn location_insert_patches_only_the_location() {
    let rows = MockRowStore::new();
    rows.seed_select(tables::VEHICLES, vec![vehicle_row("v1", "c1")]);

    let client = signed_in_client(&rows).await;
    assert!(wait_until(WAIT, || rows.subscriber_count() == 3).await);

    rows.push_change(
        tables::VEHICLE_LOCATIONS,
        ChangeKind::Insert,
        json!({"vehicle_id": "v1", "lat": 10.5, "lng": -85.0, "speed": 33.0}),
    );

    assert!(
        wait_until(WAIT, || {
            client
                .state()
                .vehicle("v1")
                .and_then(|v| v.location)
                .is_some_and(|loc| loc.lat == 10.5)
        })
        .await
    );
    // Everything except the location is untouched.
    let state = client.state();
    let v = state.vehicle("v1").unwrap();
    assert_eq!(v.speed, 10.0);
    assert_eq!(v.status, VehicleStatus::Active);

    client.shutdown().await;
}

#[tokio::test]
async fn malformed_location_row_is_dropped() {
    let rows = MockRowStore::new();
    rows.seed_select(tables::VEHICLES, vec![vehicle_row("v1", "c1")]);

    let client = signed_in_client(&rows).await;
    assert!(wait_until(WAIT, || rows.subscriber_count() == 3).await);
    assert!(wait_until(WAIT, || !client.state().is_loading).await);

    // Missing lng; must not dispatch anything.
    rows.push_change(
        tables::VEHICLE_LOCATIONS,
        ChangeKind::Insert,
        json!({"vehicle_id": "v1", "lat": 10.5}),
    );
    // Followed by a valid row so we can observe the pump is still alive.
    rows.push_change(
        tables::VEHICLE_LOCATIONS,
        ChangeKind::Insert,
        json!({"vehicle_id": "v1", "lat": 11.0, "lng": -85.0}),
    );

    assert!(
        wait_until(WAIT, || {
            client
                .state()
                .vehicle("v1")
                .and_then(|v| v.location)
                .is_some_and(|loc| loc.lat == 11.0)
        })
        .await
    );

    client.shutdown().await;
}

#[tokio::test]
async fn critical_event_synthesizes_an_alert() {
    let rows = MockRowStore::new();
    rows.seed_select(tables::VEHICLES, vec![vehicle_row("v1", "c1")]);

    let client = signed_in_client(&rows).await;
    assert!(wait_until(WAIT, || rows.subscriber_count() == 3).await);

    rows.push_change(tables::SECURITY_EVENTS, ChangeKind::Insert, event_row("e1", "critical"));
    rows.push_change(tables::SECURITY_EVENTS, ChangeKind::Insert, event_row("e2", "low"));

    assert!(
        wait_until(WAIT, || client.state().security_events.len() == 2).await
    );
    let state = client.state();
    // Most recent first; only the critical one raised an alert.
    assert_eq!(state.security_events[0].id, "e2");
    assert_eq!(state.alerts.len(), 1);
    assert_eq!(state.alerts[0].id, "alert-e1");
    assert_eq!(state.alerts[0].vehicle_id, "v1");

    client.shutdown().await;
}

#[tokio::test]
async fn sign_out_clears_state_and_closes_subscriptions() {
    let rows = MockRowStore::new();
    rows.seed_select(tables::VEHICLES, vec![vehicle_row("v1", "c1")]);
    rows.seed_select(tables::COMPANIES, vec![json!({"id": "c1", "name": "Acme"})]);

    let client = signed_in_client(&rows).await;
    assert!(wait_until(WAIT, || !client.state().vehicles.is_empty()).await);
    assert!(wait_until(WAIT, || rows.subscriber_count() == 3).await);

    client.sign_out();

    assert!(
        wait_until(WAIT, || {
            let s = client.state();
            s.vehicles.is_empty() && s.companies.is_empty()
        })
        .await
    );
    assert!(
        wait_until(WAIT, || rows.subscriber_count() == 0).await,
        "subscriptions must close on sign-out"
    );

    client.shutdown().await;
}

#[tokio::test]
async fn identity_change_rebinds_without_leaking_subscriptions() {
    let rows = MockRowStore::new();
    rows.seed_select(tables::VEHICLES, vec![vehicle_row("v1", "c1")]);

    let client = signed_in_client(&rows).await;
    assert!(wait_until(WAIT, || rows.subscriber_count() == 3).await);

    client.sign_in(UserProfile::new("u2"));

    // The old binding closes before the new one opens, so the count
    // settles back at exactly three rather than accumulating.
    assert!(
        wait_until(WAIT, || rows.subscriber_count() == 3).await,
        "got {} subscriptions after rebind",
        rows.subscriber_count()
    );
    // The new binding is live: a change still reaches the state.
    let mut updated = vehicle_row("v1", "c1");
    updated["status"] = json!("offline");
    rows.push_change(tables::VEHICLES, ChangeKind::Update, updated);
    assert!(
        wait_until(WAIT, || {
            client
                .state()
                .vehicle("v1")
                .is_some_and(|v| v.status == VehicleStatus::Offline)
        })
        .await
    );
    assert_eq!(rows.subscriber_count(), 3);

    client.shutdown().await;
}

#[tokio::test]
async fn vehicle_fetch_failure_clears_loading() {
    let rows = MockRowStore::new();
    rows.fail_select(tables::VEHICLES);

    let client = signed_in_client(&rows).await;

    assert!(
        wait_until(WAIT, || !client.state().is_loading).await,
        "loading flag must clear on fetch failure"
    );
    assert!(client.state().vehicles.is_empty());

    client.shutdown().await;
}

#[tokio::test]
async fn company_filter_narrows_the_visible_fleet() {
    let rows = MockRowStore::new();
    rows.seed_select(
        tables::VEHICLES,
        vec![vehicle_row("v1", "c1"), vehicle_row("v2", "c2")],
    );

    let client = signed_in_client(&rows).await;
    assert!(wait_until(WAIT, || client.state().vehicles.len() == 2).await);

    client.select_company(Some("c2".into()));
    assert!(
        wait_until(WAIT, || {
            let s = client.state();
            let visible = s.filtered_vehicles();
            visible.len() == 1 && visible[0].id == "v2"
        })
        .await
    );

    client.select_company(None);
    assert!(wait_until(WAIT, || client.state().filtered_vehicles().len() == 2).await);

    client.shutdown().await;
}

// ── Event logging ───────────────────────────────────────────────────

#[tokio::test]
async fn log_security_event_writes_a_hashed_row() {
    let rows = MockRowStore::new();
    let client = signed_in_client(&rows).await;

    client
        .log_security_event(
            SecurityEventType::Sos,
            Severity::Critical,
            json!({"location": {"lat": 1.0, "lng": 2.0}, "note": "panic"}),
            Some("v1"),
        )
        .await
        .unwrap();

    let inserts = rows.inserts();
    assert_eq!(inserts.len(), 1);
    let (table, row) = &inserts[0];
    assert_eq!(table, tables::SECURITY_EVENTS);
    assert_eq!(row["user_id"], "u1");
    assert_eq!(row["vehicle_id"], "v1");
    assert_eq!(row["type"], "SOS");
    assert_eq!(row["severity"], "critical");
    assert_eq!(row["location"]["lat"], 1.0);

    let hash = row["legal_hash"].as_str().unwrap();
    assert_eq!(hash.len(), 64);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

    client.shutdown().await;
}

#[tokio::test]
async fn log_security_event_without_identity_is_a_silent_noop() {
    let rows = MockRowStore::new();
    let client = FleetClient::from_arc(rows.clone());
    client.start().await;

    client
        .log_security_event(SecurityEventType::Tamper, Severity::Low, json!({}), None)
        .await
        .unwrap();

    assert_eq!(rows.insert_count(), 0);

    client.shutdown().await;
}
