use crate::config::Config;
use crate::core::site::{SiteCheck, require_on_site};
use crate::db::log::oplog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries::atomic;
use crate::db::queries::attendance::{insert_attendance, last_for_profile};
use crate::db::queries::profiles::{get_profile, update_last_location};
use crate::errors::{AppError, AppResult};
use crate::models::attendance::{AttendanceEvent, AttendanceKind};
use crate::models::coordinates::PositionSample;

/// Geofenced check-in / check-out of a technician at a branch.
pub struct AttendanceLogic;

impl AttendanceLogic {
    pub fn record(
        pool: &DbPool,
        cfg: &Config,
        profile_id: i64,
        branch_id: i64,
        kind: AttendanceKind,
        sample: &PositionSample,
    ) -> AppResult<(AttendanceEvent, SiteCheck)> {
        let profile = get_profile(&pool.conn, profile_id)?;

        // Check-in/out must alternate per person; the first event must be a check-in.
        let last = last_for_profile(&pool.conn, profile_id)?;
        let last_was_in = last.as_ref().is_some_and(|e| e.kind.is_in());
        if kind.is_in() == last_was_in {
            return Err(AppError::InvalidInput(format!(
                "{} cannot {}: last event was {}",
                profile.name,
                kind.to_db_str(),
                last.map(|e| e.kind.to_db_str()).unwrap_or("none")
            )));
        }
        // a check-out closes the check-in at the same branch
        if !kind.is_in()
            && let Some(open) = &last
            && open.branch_id != branch_id
        {
            return Err(AppError::InvalidInput(format!(
                "{} is checked in at branch #{}, not #{branch_id}",
                profile.name, open.branch_id
            )));
        }

        let check = require_on_site(&pool.conn, cfg, branch_id, Some(sample))?;

        let id = atomic(&pool.conn, |tx| {
            let id = insert_attendance(
                tx,
                profile_id,
                branch_id,
                kind,
                sample,
                check.decision.distance_meters,
            )?;
            update_last_location(tx, profile_id, sample)?;
            Ok(id)
        })?;

        oplog_quiet(
            &pool.conn,
            kind.to_db_str(),
            &profile.name,
            &format!(
                "{} at {} ({})",
                kind.to_db_str(),
                check.branch.name,
                check.decision.distance_label()
            ),
        );

        let event = last_for_profile(&pool.conn, profile_id)?
            .filter(|e| e.id == id)
            .ok_or(AppError::NotFound {
                entity: "Attendance",
                id,
            })?;
        Ok((event, check))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::org::{NewBranch, insert_branch};
    use crate::db::queries::profiles::insert_profile;
    use crate::models::coordinates::Coordinates;
    use crate::models::profile::Role;

    fn setup() -> (DbPool, i64, i64) {
        let pool = DbPool::in_memory().unwrap();
        let branch = insert_branch(
            &pool.conn,
            &NewBranch {
                brand_id: None,
                name: "Downtown",
                location: Some(Coordinates::new(30.0444, 31.2357)),
                geofence_radius_meters: None,
            },
        )
        .unwrap();
        let tech = insert_profile(&pool.conn, "Karim", Role::Technician).unwrap();
        (pool, branch, tech)
    }

    #[test]
    fn check_in_then_out_on_site() {
        let (pool, branch, tech) = setup();
        let cfg = Config::default();
        let near = PositionSample::new(30.0454, 31.2357);

        let (ev, _) =
            AttendanceLogic::record(&pool, &cfg, tech, branch, AttendanceKind::CheckIn, &near)
                .unwrap();
        assert_eq!(ev.kind, AttendanceKind::CheckIn);
        assert!(ev.distance_meters.is_some());

        let profile = get_profile(&pool.conn, tech).unwrap();
        assert_eq!(profile.last_location, Some(near.coordinates()));

        // double check-in refused
        assert!(
            AttendanceLogic::record(&pool, &cfg, tech, branch, AttendanceKind::CheckIn, &near)
                .is_err()
        );

        let (ev, _) =
            AttendanceLogic::record(&pool, &cfg, tech, branch, AttendanceKind::CheckOut, &near)
                .unwrap();
        assert_eq!(ev.kind, AttendanceKind::CheckOut);
    }

    #[test]
    fn check_out_must_match_the_check_in_branch() {
        let (pool, branch, tech) = setup();
        let cfg = Config::default();
        let uptown = insert_branch(
            &pool.conn,
            &NewBranch {
                brand_id: None,
                name: "Uptown",
                location: Some(Coordinates::new(30.0600, 31.2500)),
                geofence_radius_meters: None,
            },
        )
        .unwrap();
        let near = PositionSample::new(30.0454, 31.2357);
        let near_uptown = PositionSample::new(30.0605, 31.2500);

        AttendanceLogic::record(&pool, &cfg, tech, branch, AttendanceKind::CheckIn, &near)
            .unwrap();

        // on site at Uptown, but the open check-in is Downtown
        let err = AttendanceLogic::record(
            &pool,
            &cfg,
            tech,
            uptown,
            AttendanceKind::CheckOut,
            &near_uptown,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref m) if m.contains("not #2")), "{err}");

        let last = last_for_profile(&pool.conn, tech).unwrap().unwrap();
        assert_eq!(last.kind, AttendanceKind::CheckIn);
        assert_eq!(last.branch_id, branch);
        let profile = get_profile(&pool.conn, tech).unwrap();
        assert_eq!(profile.last_location, Some(near.coordinates()));

        AttendanceLogic::record(&pool, &cfg, tech, branch, AttendanceKind::CheckOut, &near)
            .unwrap();
    }

    #[test]
    fn failed_location_update_drops_the_event() {
        let (pool, branch, tech) = setup();
        let near = PositionSample::new(30.0454, 31.2357);
        // the row lands, the profile update that follows aborts
        pool.conn
            .execute_batch(
                "CREATE TRIGGER no_moves BEFORE UPDATE OF last_lat ON profiles
                 BEGIN SELECT RAISE(ABORT, 'profiles are read-only'); END;",
            )
            .unwrap();

        assert!(
            AttendanceLogic::record(
                &pool,
                &Config::default(),
                tech,
                branch,
                AttendanceKind::CheckIn,
                &near
            )
            .is_err()
        );
        assert!(last_for_profile(&pool.conn, tech).unwrap().is_none());
    }

    #[test]
    fn off_site_check_in_is_not_stored() {
        let (pool, branch, tech) = setup();
        let far = PositionSample::new(30.0544, 31.2357);
        let err = AttendanceLogic::record(
            &pool,
            &Config::default(),
            tech,
            branch,
            AttendanceKind::CheckIn,
            &far,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::OutsideGeofence { .. }));
        assert!(last_for_profile(&pool.conn, tech).unwrap().is_none());
    }

    #[test]
    fn first_event_must_be_check_in() {
        let (pool, branch, tech) = setup();
        let near = PositionSample::new(30.0454, 31.2357);
        assert!(
            AttendanceLogic::record(
                &pool,
                &Config::default(),
                tech,
                branch,
                AttendanceKind::CheckOut,
                &near
            )
            .is_err()
        );
    }
}
