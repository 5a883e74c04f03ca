//! `fleetsat watch` — follow live fleet state.

use fleetsat_core::{FleetClient, UserProfile};
use fleetsat_store::RowStoreClient;

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let user = super::require_user(global)?;
    let config = super::build_store_config(global)?;

    let rows = RowStoreClient::connect(config)?;
    let client = FleetClient::new(rows);
    client.start().await;
    client.sign_in(UserProfile::new(user));

    if let Some(company) = args.company {
        client.select_company(Some(company));
    }

    let color = output::should_color(&global.color);
    let mut state = client.watch_state();

    println!("watching fleet state (Ctrl-C to stop)");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = state.borrow_and_update().clone();
                println!("{}", output::render_state(&snapshot, color));
            }
        }
    }

    client.sign_out();
    client.shutdown().await;
    Ok(())
}
