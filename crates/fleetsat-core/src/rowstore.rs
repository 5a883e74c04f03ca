// ── Row store seam ──
//
// The trait the domain layer consumes for durable rows and change
// notifications. `fleetsat_store::RowStoreClient` is the production
// implementation; tests supply in-process fakes.

use fleetsat_store::{ChangeKind, Error, SubscriptionHandle};

/// Table names on the wire.
pub mod tables {
    pub const VEHICLES: &str = "vehicles";
    pub const VEHICLE_LOCATIONS: &str = "vehicle_locations";
    pub const SECURITY_EVENTS: &str = "security_events";
    pub const COMPANIES: &str = "companies";
}

/// Generic row storage with insert/select and change-notification
/// subscriptions. At-least-once delivery; consumers merge idempotently.
pub trait RowStore: Send + Sync + 'static {
    /// Insert one row.
    fn insert(
        &self,
        table: &str,
        row: serde_json::Value,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Fetch every row of a table (snapshot).
    fn select_all(
        &self,
        table: &str,
    ) -> impl Future<Output = Result<Vec<serde_json::Value>, Error>> + Send;

    /// Open a change subscription for `(table, kind)`.
    fn subscribe(&self, table: &str, kind: ChangeKind) -> SubscriptionHandle;
}

impl RowStore for fleetsat_store::RowStoreClient {
    async fn insert(&self, table: &str, row: serde_json::Value) -> Result<(), Error> {
        Self::insert(self, table, row).await
    }

    async fn select_all(&self, table: &str) -> Result<Vec<serde_json::Value>, Error> {
        Self::select_all(self, table).await
    }

    fn subscribe(&self, table: &str, kind: ChangeKind) -> SubscriptionHandle {
        Self::subscribe(self, table, kind)
    }
}
