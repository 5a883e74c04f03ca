//! Domain layer between `fleetsat-store` and UI consumers.
//!
//! This crate owns the business logic, domain model, and reactive state
//! infrastructure for the fleetsat workspace:
//!
//! - **[`FleetClient`]** — Central facade: holds the state store, publishes
//!   identity changes, runs the [`SubscriptionOrchestrator`] in the
//!   background, and exposes the tamper-evident event-logging write path.
//!
//! - **[`StateStore`]** — Single-writer reactive storage: a pure reducer
//!   ([`store::reduce`]) applied strictly in dispatch order, observed
//!   through a `tokio::sync::watch` channel of immutable snapshots.
//!
//! - **[`SubscriptionOrchestrator`]** — Binds snapshot fetches and the
//!   three change subscriptions to the current identity, closing the
//!   previous binding before opening the next.
//!
//! - **[`LocationReporter`]** — Device-side tracking loop: samples a
//!   [`PositionSource`] and writes throttled location rows, at most one
//!   per [`MIN_SEND_INTERVAL`] per vehicle.
//!
//! - **Domain model** ([`model`]) — Canonical types (`Vehicle`,
//!   `SecurityEvent`, `Alert`, `Company`, `GeoPoint`).

pub mod client;
pub mod convert;
pub mod error;
pub mod hasher;
pub mod model;
pub mod orchestrator;
pub mod position;
pub mod reporter;
pub mod rowstore;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::FleetClient;
pub use convert::LocationUpdate;
pub use error::CoreError;
pub use hasher::{HashPayload, generate_hash};
pub use orchestrator::SubscriptionOrchestrator;
pub use position::{PositionError, PositionFix, PositionSource, WatchOptions};
pub use reporter::{LocationReporter, MIN_SEND_INTERVAL, TrackerStatus, WriteFailure};
pub use rowstore::{RowStore, tables};
pub use store::{Action, DomainState, StateStore, reduce};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Alert, AlertType, Company, GeoPoint, SecurityEvent, SecurityEventType, Severity, UserProfile,
    Vehicle, VehicleStatus,
};
