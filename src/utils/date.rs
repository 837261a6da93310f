use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Like [`parse_date`], reporting the offending input.
pub fn require_date(s: &str) -> AppResult<NaiveDate> {
    parse_date(s.trim()).ok_or_else(|| AppError::InvalidDate(s.to_string()))
}

/// First and last day of the month containing `d`.
pub fn month_bounds(d: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = d.with_day(1).unwrap_or(d);
    let next_month = if d.month() == 12 {
        NaiveDate::from_ymd_opt(d.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(d.year(), d.month() + 1, 1)
    };
    let last = next_month.and_then(|n| n.pred_opt()).unwrap_or(d);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_handles_december_and_leap_years() {
        let d = |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        assert_eq!(month_bounds(d("2024-02-10")), (d("2024-02-01"), d("2024-02-29")));
        assert_eq!(month_bounds(d("2025-12-31")), (d("2025-12-01"), d("2025-12-31")));
    }
}
