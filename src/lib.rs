//! maintdesk library root.
//! Exposes the CLI parser, the high-level run() function, and internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod geofence;
pub mod models;
pub mod reports;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter (e.g. `maintdesk=debug`).
pub const LOG_ENV: &str = "MAINTDESK_LOG";

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let by = cli.acting_as;
    let cmd = &cli.command;

    match cmd {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(cmd, cfg),
        Commands::Db { .. } => commands::db::handle(cmd, cfg),
        Commands::Log { .. } => commands::log::handle(cmd, cfg),
        Commands::Brand { .. }
        | Commands::Branch { .. }
        | Commands::Sector { .. }
        | Commands::Area { .. } => commands::org::handle(cmd, cfg),
        Commands::Tech { .. } => commands::tech::handle(cmd, cfg),
        Commands::Asset { .. } => commands::asset::handle(cmd, cfg, by),
        Commands::Ticket { .. } => commands::ticket::handle(cmd, cfg, by),
        Commands::Part { .. } => commands::part::handle(cmd, cfg, by),
        Commands::Checkin(_) | Commands::Checkout(_) => commands::attendance::handle(cmd, cfg),
        Commands::Track { .. } => commands::track::handle(cmd, cfg),
        Commands::Ping { .. } => commands::ping::handle(cmd, cfg),
        Commands::Schedule { .. } => commands::schedule::handle(cmd, cfg, by),
        Commands::Stats { .. } => commands::stats::handle(cmd, cfg, by),
        Commands::Report { .. } => commands::report::handle(cmd, cfg, by),
        Commands::Audit { .. } => commands::audit::handle(cmd, cfg),
        Commands::Settings { .. } => commands::settings::handle(cmd, cfg),
        Commands::Export { .. } => commands::export::handle(cmd, cfg),
    }
}

/// Diagnostics go to stderr, filtered by `MAINTDESK_LOG` (default: warn).
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // a second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    init_tracing();

    // 1️⃣ parse CLI
    let cli = Cli::parse();

    // 2️⃣ carica config UNA sola volta
    let mut cfg = Config::load()?;

    // 3️⃣ applica eventuale override del DB da riga di comando
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    tracing::debug!(database = %cfg.database, "configuration loaded");

    // 4️⃣ passa tutto al dispatcher
    dispatch(&cli, &cfg)
}
