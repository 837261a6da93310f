use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Preventive maintenance plan for one asset.
#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceSchedule {
    pub id: i64,
    pub asset_id: i64,
    pub title: String,
    pub frequency_days: i64,
    pub next_due: NaiveDate,
    pub last_done: Option<NaiveDate>,
    pub active: bool,
}

impl MaintenanceSchedule {
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.active && self.next_due <= today
    }

    /// Next due date after a run on `today`.
    ///
    /// Missed periods are skipped: the new date is always after `today`.
    pub fn advance_from(&self, today: NaiveDate) -> NaiveDate {
        let step = Duration::days(self.frequency_days.max(1));
        let mut next = self.next_due + step;
        while next <= today {
            next += step;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(next_due: &str, frequency_days: i64) -> MaintenanceSchedule {
        MaintenanceSchedule {
            id: 1,
            asset_id: 1,
            title: "Filter cleaning".into(),
            frequency_days,
            next_due: NaiveDate::parse_from_str(next_due, "%Y-%m-%d").unwrap(),
            last_done: None,
            active: true,
        }
    }

    #[test]
    fn due_on_and_after_next_due() {
        let s = schedule("2025-03-10", 30);
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        assert!(!s.is_due(d("2025-03-09")));
        assert!(s.is_due(d("2025-03-10")));
        assert!(s.is_due(d("2025-04-01")));
    }

    #[test]
    fn advance_skips_missed_periods() {
        let s = schedule("2025-01-01", 30);
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(
            s.advance_from(today),
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        );
    }

    #[test]
    fn inactive_schedules_are_never_due() {
        let mut s = schedule("2025-01-01", 7);
        s.active = false;
        assert!(!s.is_due(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    }
}
