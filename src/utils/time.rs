//! Time utilities: ISO timestamps as stored, user-supplied instants, ages.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, SecondsFormat};

/// Current local time, formatted the way every timestamp column stores it.
pub fn now_iso() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parse an instant typed on the command line into a stored timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD HH:MM` and a bare
/// `YYYY-MM-DD` (midnight). Naive values are taken in local time.
pub fn parse_instant(input: &str) -> AppResult<String> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.to_rfc3339_opts(SecondsFormat::Secs, false));
    }

    let naive = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| AppError::InvalidDate(s.to_string()))?;

    let local = naive
        .and_local_timezone(Local)
        .earliest()
        .ok_or_else(|| AppError::InvalidDate(format!("{s} does not exist in local time")))?;

    Ok(local.to_rfc3339_opts(SecondsFormat::Secs, false))
}

/// Whole hours elapsed between `since` and `now`.
pub fn age_hours(since: DateTime<FixedOffset>, now: DateTime<FixedOffset>) -> i64 {
    (now - since).num_hours()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_is_kept_with_offset() {
        assert_eq!(
            parse_instant("2025-03-01T10:15:00+02:00").unwrap(),
            "2025-03-01T10:15:00+02:00"
        );
    }

    #[test]
    fn bare_dates_are_local_midnight() {
        let s = parse_instant("2025-03-01").unwrap();
        assert!(s.starts_with("2025-03-01T00:00:00"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            parse_instant("yesterday"),
            Err(AppError::InvalidDate(_))
        ));
    }

    #[test]
    fn age_in_hours() {
        let a = DateTime::parse_from_rfc3339("2025-03-01T08:00:00+00:00").unwrap();
        let b = DateTime::parse_from_rfc3339("2025-03-02T10:30:00+00:00").unwrap();
        assert_eq!(age_hours(a, b), 26);
    }
}
