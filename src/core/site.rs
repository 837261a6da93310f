//! Geofence checks for actions bound to a branch.

use crate::config::Config;
use crate::db::queries::org::get_branch;
use crate::errors::{AppError, AppResult};
use crate::geofence::{GeofenceConfig, GeofenceDecision, GeofenceError, evaluate};
use crate::models::coordinates::PositionSample;
use crate::models::org::Branch;
use rusqlite::Connection;
use tracing::debug;

/// Geofence parameters for one branch: stored settings (or the config
/// defaults), with the branch's own radius when it has one.
pub fn site_config(conn: &Connection, cfg: &Config, branch: &Branch) -> AppResult<GeofenceConfig> {
    Ok(GeofenceConfig::load(conn, cfg.geofence_fallback())?
        .with_radius(branch.geofence_radius_meters))
}

/// Outcome of a site check that let the action through.
#[derive(Debug, Clone)]
pub struct SiteCheck {
    pub branch: Branch,
    pub decision: GeofenceDecision,
}

/// Gate an action at `branch_id` on the given position.
///
/// Fails with `OutsideGeofence` when the sample is too far away. Without a
/// sample the action only passes if the geofence is off for that site.
pub fn require_on_site(
    conn: &Connection,
    cfg: &Config,
    branch_id: i64,
    sample: Option<&PositionSample>,
) -> AppResult<SiteCheck> {
    let branch = get_branch(conn, branch_id)?;
    let gf = site_config(conn, cfg, &branch)?;

    if !gf.enabled {
        return Ok(SiteCheck {
            branch,
            decision: GeofenceDecision::disabled(gf.radius_meters),
        });
    }

    let Some(sample) = sample else {
        return Err(GeofenceError::PositionUnavailable("no coordinates given".into()).into());
    };

    let Some(target) = branch.location else {
        return Err(AppError::InvalidInput(format!(
            "branch '{}' has no coordinates, set them before using geofenced actions",
            branch.name
        )));
    };

    let decision = evaluate(&gf, target, sample);
    debug!(
        branch = branch.id,
        distance = ?decision.distance_meters,
        radius = decision.radius_meters,
        allowed = decision.allowed,
        "site check"
    );

    if !decision.allowed {
        return Err(AppError::OutsideGeofence {
            distance: decision.distance_label(),
            radius_meters: decision.radius_meters,
        });
    }

    Ok(SiteCheck { branch, decision })
}
