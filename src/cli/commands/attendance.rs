use crate::cli::commands::describe_decision;
use crate::cli::parser::{AttendanceArgs, Commands};
use crate::config::Config;
use crate::core::attendance::AttendanceLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::attendance::AttendanceKind;
use crate::models::coordinates::PositionSample;
use crate::ui::messages::{location, success};

/// `checkin` and `checkout`: both are refused outside the branch geofence.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let (kind, args) = match cmd {
        Commands::Checkin(args) => (AttendanceKind::CheckIn, args),
        Commands::Checkout(args) => (AttendanceKind::CheckOut, args),
        _ => return Ok(()),
    };
    record(cfg, kind, args)
}

fn record(cfg: &Config, kind: AttendanceKind, args: &AttendanceArgs) -> AppResult<()> {
    let pool = DbPool::open(&cfg.database)?;

    let mut sample = PositionSample::new(args.lat, args.lng);
    sample.accuracy = args.accuracy;

    let (event, check) =
        AttendanceLogic::record(&pool, cfg, args.tech, args.branch, kind, &sample)?;

    location(describe_decision(&check.decision, &check.branch.name));
    success(format!(
        "Checked {} at {} (#{}, {}).",
        kind.label(),
        check.branch.name,
        event.id,
        event.created_at
    ));
    Ok(())
}
