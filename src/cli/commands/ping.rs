use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::tracking::PingLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::geofence::{LocationProvider, NoLocationProvider, ReplayProvider};
use crate::ui::messages::success;
use crate::utils::path::expand_tilde;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Ping {
        tech,
        file,
        every_ms,
        cadence_ms,
    } = cmd
    else {
        return Ok(());
    };
    let pool = DbPool::open(&cfg.database)?;
    let every = every_ms.map(Duration::from_millis).unwrap_or(cfg.location_ping());
    let cadence = cadence_ms.map(Duration::from_millis).unwrap_or(cfg.geofence_poll());

    match file {
        Some(f) => {
            let provider = ReplayProvider::from_jsonl(&expand_tilde(f), cadence)?;
            ping(&pool, cfg, *tech, provider, every)
        }
        None => ping(&pool, cfg, *tech, NoLocationProvider, every),
    }
}

fn ping<P: LocationProvider + 'static>(
    pool: &DbPool,
    cfg: &Config,
    profile_id: i64,
    provider: P,
    every: Duration,
) -> AppResult<()> {
    let stored = PingLogic::run(
        pool,
        cfg,
        profile_id,
        provider,
        every,
        CancellationToken::new(),
        |s| println!("📍 {:.5}, {:.5}", s.lat, s.lng),
    )?;
    success(format!("{stored} position(s) stored for profile #{profile_id}."));
    Ok(())
}
