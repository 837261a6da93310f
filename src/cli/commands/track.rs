use crate::cli::commands::describe_decision;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::tracking::{TrackLogic, state_label};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::geofence::{GeofenceState, LocationProvider, NoLocationProvider, ReplayProvider};
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::colorize_allowed;
use crate::utils::path::expand_tilde;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Track {
        branch,
        file,
        cadence_ms,
    } = cmd
    else {
        return Ok(());
    };
    let pool = DbPool::open(&cfg.database)?;
    let cadence = cadence_ms.map(Duration::from_millis).unwrap_or(cfg.geofence_poll());

    // senza registrazione non c'è alcuna sorgente di posizione
    match file {
        Some(f) => {
            let provider = ReplayProvider::from_jsonl(&expand_tilde(f), cadence)?;
            info(format!("Replaying {} position update(s)…", provider.len()));
            track(&pool, cfg, *branch, provider)
        }
        None => track(&pool, cfg, *branch, NoLocationProvider),
    }
}

fn track<P: LocationProvider + 'static>(
    pool: &DbPool,
    cfg: &Config,
    branch_id: i64,
    provider: P,
) -> AppResult<()> {
    let last = TrackLogic::run(
        pool,
        cfg,
        branch_id,
        provider,
        CancellationToken::new(),
        print_state,
    )?;

    match last {
        GeofenceState::Allowed(_) => success("On site: actions at this branch are allowed."),
        GeofenceState::Denied(_) => warning("Outside the branch area."),
        GeofenceState::Error(e) => return Err(e.into()),
        GeofenceState::Idle | GeofenceState::Initializing => {
            warning("No position was received.")
        }
    }
    Ok(())
}

fn print_state(state: &GeofenceState) {
    let label = state_label(state);
    match state.decision() {
        Some(d) => println!(
            "{:<12} {}",
            colorize_allowed(label, d.allowed),
            describe_decision(d, "site")
        ),
        None => println!("{label}"),
    }
}
