pub mod asset;
pub mod attendance;
pub mod audit;
pub mod config;
pub mod db;
pub mod export;
pub mod init;
pub mod log;
pub mod org;
pub mod part;
pub mod ping;
pub mod report;
pub mod schedule;
pub mod settings;
pub mod stats;
pub mod tech;
pub mod ticket;
pub mod track;

use crate::errors::{AppError, AppResult};
use crate::export::parse_range;
use crate::geofence::{GeofenceDecision, format_distance};
use crate::models::ticket::{TicketPriority, TicketStatus};
use crate::utils::date::{month_bounds, today};
use crate::utils::table::Table;
use chrono::NaiveDate;

pub(crate) fn parse_status(s: &str) -> AppResult<TicketStatus> {
    TicketStatus::from_input(s).ok_or_else(|| AppError::InvalidStatus(s.to_string()))
}

pub(crate) fn parse_priority(s: &str) -> AppResult<TicketPriority> {
    TicketPriority::from_input(s).ok_or_else(|| AppError::InvalidPriority(s.to_string()))
}

/// `--range` bounds; the current month when absent.
pub(crate) fn range_or_current_month(range: Option<&str>) -> AppResult<(NaiveDate, NaiveDate)> {
    match range {
        Some(r) => parse_range(r),
        None => Ok(month_bounds(today())),
    }
}

/// `--as` is mandatory for commands scoped to a user.
pub(crate) fn require_user(acting_as: Option<i64>) -> AppResult<i64> {
    acting_as.ok_or_else(|| AppError::InvalidInput("this command needs --as <PROFILE_ID>".into()))
}

/// "123 m from Downtown (radius 200 m)", or a note that the check was off.
pub(crate) fn describe_decision(decision: &GeofenceDecision, site: &str) -> String {
    match decision.distance_meters {
        Some(d) => format!(
            "{} from {site} (radius {})",
            format_distance(d),
            format_distance(decision.radius_meters)
        ),
        None => format!("geofence disabled at {site}"),
    }
}

pub(crate) fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "--".to_string())
}

pub(crate) fn print_or_empty(t: &Table, empty: &str) {
    if t.is_empty() {
        println!("{empty}");
    } else {
        print!("{}", t.render());
    }
}
