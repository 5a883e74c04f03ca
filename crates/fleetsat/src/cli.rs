//! Clap derive structures for the `fleetsat` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fleetsat -- fleet tracking from the command line
#[derive(Debug, Parser)]
#[command(
    name = "fleetsat",
    version,
    about = "Track vehicles and watch fleet state from the command line",
    long_about = "A client for the fleetsat row service.\n\n\
        `track` reports this device's position as a vehicle; `watch` follows\n\
        the live fleet state; `log-event` records a tamper-evident security\n\
        event.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Row service base URL
    #[arg(long, short = 'u', env = "FLEETSAT_URL", global = true)]
    pub url: Option<String>,

    /// Service API key
    #[arg(long, env = "FLEETSAT_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Operator identity (user id)
    #[arg(long, env = "FLEETSAT_USER", global = true)]
    pub user: Option<String>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Request timeout in seconds
    #[arg(long, env = "FLEETSAT_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report this device's position as a vehicle
    Track(TrackArgs),
    /// Watch live fleet state
    Watch(WatchArgs),
    /// Record a security event
    #[command(name = "log-event")]
    LogEvent(LogEventArgs),
}

#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Vehicle identifier (case-insensitive; stored uppercased)
    #[arg(long)]
    pub vehicle: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Only show vehicles belonging to this company id
    #[arg(long)]
    pub company: Option<String>,
}

#[derive(Debug, Args)]
pub struct LogEventArgs {
    /// Event type: SOS, geofence_breach, tamper, fatigue_warning
    #[arg(long = "type")]
    pub event_type: String,

    /// Severity: low, medium, high, critical
    #[arg(long)]
    pub severity: String,

    /// Structured details as a JSON object
    #[arg(long)]
    pub details: Option<String>,

    /// Vehicle the event concerns
    #[arg(long)]
    pub vehicle: Option<String>,
}
