//! Terminal output helpers for the live views.
//!
//! Colors respect `--color`, `NO_COLOR`, and whether stdout is a tty.

use std::io::{self, IsTerminal};

use owo_colors::OwoColorize;

use fleetsat_core::reporter::{TrackerStatus, WriteFailure};
use fleetsat_core::{DomainState, Severity};

use crate::cli::ColorMode;

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// One line per status transition, in the tracker view.
pub fn render_status(status: &TrackerStatus, color: bool) -> String {
    let label = match status {
        TrackerStatus::Idle => "idle".to_owned(),
        TrackerStatus::Requesting => "requesting position fix...".to_owned(),
        TrackerStatus::Tracking => "tracking".to_owned(),
        TrackerStatus::Sending => "sending location...".to_owned(),
        TrackerStatus::Sent { at } => format!("sent at {}", at.format("%H:%M:%S")),
        TrackerStatus::Failed { message } => format!("failed: {message}"),
        TrackerStatus::Stopped => "stopped".to_owned(),
    };
    if !color {
        return label;
    }
    match status {
        TrackerStatus::Sent { .. } => label.green().to_string(),
        TrackerStatus::Failed { .. } => label.red().bold().to_string(),
        TrackerStatus::Stopped => label.dimmed().to_string(),
        _ => label,
    }
}

pub fn render_write_failure(failure: &WriteFailure, color: bool) -> String {
    let code = failure.code.as_deref().unwrap_or("unknown");
    let line = format!(
        "write failed ({code}) at {}: {}",
        failure.at.format("%H:%M:%S"),
        failure.message
    );
    if color {
        line.yellow().to_string()
    } else {
        line
    }
}

/// Compact one-line fleet summary plus any active alerts, for the watch
/// view.
pub fn render_state(state: &DomainState, color: bool) -> String {
    let mut out = String::new();

    let visible = state.filtered_vehicles();
    out.push_str(&format!(
        "vehicles: {}/{}  companies: {}  events: {}{}",
        visible.len(),
        state.vehicles.len(),
        state.companies.len(),
        state.security_events.len(),
        if state.is_loading { "  (loading)" } else { "" },
    ));

    for vehicle in visible {
        let position = vehicle.location.map_or_else(
            || "unknown position".to_owned(),
            |loc| format!("{:.5},{:.5}", loc.lat, loc.lng),
        );
        out.push_str(&format!(
            "\n  {}  {}  {}  {:.0} km/h",
            vehicle.id, vehicle.status, position, vehicle.speed
        ));
    }

    for alert in state.active_alerts() {
        let line = format!(
            "\n  ALERT {} [{}] vehicle {} at {}",
            alert.alert_type,
            alert.severity,
            alert.vehicle_id,
            alert.timestamp.format("%H:%M:%S"),
        );
        if color {
            out.push_str(&paint_severity(&line, alert.severity));
        } else {
            out.push_str(&line);
        }
    }

    out
}

fn paint_severity(text: &str, severity: Severity) -> String {
    match severity {
        Severity::Critical => text.red().bold().to_string(),
        Severity::High => text.red().to_string(),
        Severity::Medium => text.yellow().to_string(),
        Severity::Low => text.dimmed().to_string(),
    }
}
