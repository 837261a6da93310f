// src/export/range.rs

use crate::errors::{AppError, AppResult};
use crate::utils::date::month_bounds;
use chrono::NaiveDate;

fn bad(r: &str, why: &str) -> AppError {
    AppError::InvalidDate(format!("{r}: {why}"))
}

/// Parse --range (year / month / day / intervallo).
///
/// Supporta:
/// - YYYY
/// - YYYY-MM
/// - YYYY-MM-DD
/// - YYYY:YYYY
/// - YYYY-MM:YYYY-MM
/// - YYYY-MM-DD:YYYY-MM-DD
pub fn parse_range(r: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let r = r.trim();

    let (start, end) = match r.split_once(':') {
        Some((s, e)) => {
            let (s, e) = (s.trim(), e.trim());
            if s.len() != e.len() {
                return Err(bad(r, "start and end must have same format"));
            }
            (bounds(s)?.0, bounds(e)?.1)
        }
        None => bounds(r)?,
    };

    if start > end {
        return Err(bad(r, "start is after end"));
    }
    Ok((start, end))
}

/// First and last day covered by a single `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
fn bounds(s: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    match s.len() {
        4 => {
            let y: i32 = s.parse().map_err(|_| bad(s, "invalid year"))?;
            let d1 = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(|| bad(s, "invalid year"))?;
            let d2 = NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(|| bad(s, "invalid year"))?;
            Ok((d1, d2))
        }
        7 => {
            let first = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
                .map_err(|_| bad(s, "invalid month"))?;
            Ok(month_bounds(first))
        }
        10 => {
            let d = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| bad(s, "invalid date"))?;
            Ok((d, d))
        }
        _ => Err(bad(s, "unsupported --range format")),
    }
}
