//! `fleetsat track` — report this device's position as a vehicle.

use std::sync::Arc;

use fleetsat_core::reporter::{LocationReporter, TrackerStatus};
use fleetsat_store::RowStoreClient;

use crate::cli::{GlobalOpts, TrackArgs};
use crate::error::CliError;
use crate::output;

use super::position::StdinPositionSource;

pub async fn handle(args: TrackArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut config = super::build_store_config(global)?;
    // One-way writer: the tracker never subscribes to changes.
    config.realtime_enabled = false;

    let rows = RowStoreClient::connect(config)?;
    let reporter = LocationReporter::new(Arc::new(rows), Arc::new(StdinPositionSource));

    let color = output::should_color(&global.color);
    let mut status = reporter.status();
    let mut failures = reporter.write_errors();

    reporter.start(&args.vehicle).await?;
    println!("tracking as {} (reading lat,lng[,speed] from stdin, Ctrl-C to stop)",
        args.vehicle.trim().to_uppercase());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                reporter.stop().await;
                println!("{}", output::render_status(&reporter.current_status(), color));
                return Ok(());
            }
            changed = status.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let current = status.borrow_and_update().clone();
                println!("{}", output::render_status(&current, color));
                if let TrackerStatus::Failed { message } = current {
                    return Err(CliError::Positioning { message });
                }
            }
            changed = failures.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                if let Some(failure) = failures.borrow_and_update().clone() {
                    eprintln!("{}", output::render_write_failure(&failure, color));
                }
            }
        }
    }
}
