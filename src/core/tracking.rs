//! Streaming location commands: live geofence tracking and passive ping.
//!
//! Both build a current-thread tokio runtime for the duration of the
//! command; nothing else in the CLI is async.

use crate::config::Config;
use crate::core::site::site_config;
use crate::db::log::oplog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries::org::get_branch;
use crate::db::queries::profiles::{get_profile, update_last_location};
use crate::errors::AppResult;
use crate::geofence::{
    GeofenceEvaluator, GeofenceState, LocationProvider, spawn_location_ping,
};
use crate::models::coordinates::PositionSample;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;

fn runtime() -> AppResult<Runtime> {
    Ok(Builder::new_current_thread().enable_time().build()?)
}

pub struct TrackLogic;

impl TrackLogic {
    /// Feed the provider's samples through a live evaluator for the
    /// branch, reporting every state in the order it was reached, however
    /// fast the samples arrive. Returns the last state.
    pub fn run<P, F>(
        pool: &DbPool,
        cfg: &Config,
        branch_id: i64,
        provider: P,
        cancel: CancellationToken,
        mut on_state: F,
    ) -> AppResult<GeofenceState>
    where
        P: LocationProvider + 'static,
        F: FnMut(&GeofenceState),
    {
        let branch = get_branch(&pool.conn, branch_id)?;
        let gf = site_config(&pool.conn, cfg, &branch)?;
        let evaluator = GeofenceEvaluator::new(provider, branch.location, gf, cfg.watch_options());

        let last = runtime()?.block_on(async move {
            let mut handle = evaluator.spawn(cancel);
            let mut last = handle.state();
            while let Some(state) = handle.changed().await {
                on_state(&state);
                last = state;
            }
            handle.shutdown().await;
            last
        });

        oplog_quiet(
            &pool.conn,
            "track",
            &branch.name,
            &format!("finished in state {}", state_label(&last)),
        );
        Ok(last)
    }
}

pub fn state_label(state: &GeofenceState) -> &'static str {
    match state {
        GeofenceState::Idle => "idle",
        GeofenceState::Initializing => "initializing",
        GeofenceState::Allowed(_) => "allowed",
        GeofenceState::Denied(_) => "denied",
        GeofenceState::Error(_) => "error",
    }
}

pub struct PingLogic;

impl PingLogic {
    /// Store a technician's position at most once per `every`, until the
    /// provider stops or `cancel` fires. Returns how many positions were
    /// stored.
    pub fn run<P, F>(
        pool: &DbPool,
        cfg: &Config,
        profile_id: i64,
        provider: P,
        every: Duration,
        cancel: CancellationToken,
        mut on_sample: F,
    ) -> AppResult<usize>
    where
        P: LocationProvider + 'static,
        F: FnMut(&PositionSample),
    {
        let profile = get_profile(&pool.conn, profile_id)?;

        let stored = runtime()?.block_on(async move {
            let mut ping = spawn_location_ping(provider, cfg.watch_options(), every, cancel)?;
            let mut stored = 0usize;

            while let Some(update) = ping.next().await {
                let sample = update?;
                update_last_location(&pool.conn, profile_id, &sample)?;
                on_sample(&sample);
                stored += 1;
            }

            ping.shutdown().await;
            AppResult::Ok(stored)
        })?;

        oplog_quiet(
            &pool.conn,
            "ping",
            &profile.name,
            &format!("{stored} position(s) stored"),
        );
        Ok(stored)
    }
}
