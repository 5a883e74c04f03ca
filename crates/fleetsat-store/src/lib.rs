//! Async client for the fleetsat row service.
//!
//! [`RowStoreClient`] wraps the service's PostgREST-style REST dialect
//! (insert / select) and its realtime WebSocket change feed. The feed is
//! a single socket per client; [`RealtimeFeed::subscribe`] vends
//! client-side-filtered `(table, kind)` subscriptions off it.

pub mod config;
pub mod error;
pub mod realtime;
pub mod rest;
pub mod transport;

pub use config::StoreConfig;
pub use error::Error;
pub use realtime::{ChangeKind, ChangeRow, RealtimeFeed, ReconnectConfig, SubscriptionHandle};
pub use rest::RowStoreClient;
