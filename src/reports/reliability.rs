//! Asset reliability figures: MTBF, recurring faults, health score.
//!
//! Two screens historically computed recurrence and health with different
//! parameters. Both variants are kept as named policies so each view keeps
//! its own numbers.

use chrono::{DateTime, Duration, FixedOffset};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Mean days between failures from ticket creation times.
///
/// `(newest - oldest) / (n - 1)`, or 0 when there are fewer than two.
/// Timestamps are compared as instants, whatever their offset or order.
pub fn mtbf_days(created: &[DateTime<FixedOffset>]) -> f64 {
    let n = created.len();
    let (Some(newest), Some(oldest)) = (created.iter().max(), created.iter().min()) else {
        return 0.0;
    };
    if n <= 1 {
        return 0.0;
    }
    let days = (*newest - *oldest).num_seconds() as f64 / SECONDS_PER_DAY;
    days / (n - 1) as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurringFaultPolicy {
    pub name: &'static str,
    pub window_days: i64,
    pub threshold: usize,
    /// `true`: count must exceed the threshold; `false`: reaching it is enough.
    pub strict: bool,
}

/// Asset detail view: three or more tickets in 30 days.
pub const ASSET_DETAIL_RECURRENCE: RecurringFaultPolicy = RecurringFaultPolicy {
    name: "asset-detail",
    window_days: 30,
    threshold: 3,
    strict: false,
};

/// Asset history view: more than three tickets in 60 days.
pub const ASSET_HISTORY_RECURRENCE: RecurringFaultPolicy = RecurringFaultPolicy {
    name: "asset-history",
    window_days: 60,
    threshold: 3,
    strict: true,
};

impl RecurringFaultPolicy {
    pub fn count_in_window(
        &self,
        created: &[DateTime<FixedOffset>],
        now: DateTime<FixedOffset>,
    ) -> usize {
        let since = now - Duration::days(self.window_days);
        created.iter().filter(|c| **c >= since).count()
    }

    pub fn is_recurring(
        &self,
        created: &[DateTime<FixedOffset>],
        now: DateTime<FixedOffset>,
    ) -> bool {
        let count = self.count_in_window(created, now);
        if self.strict {
            count > self.threshold
        } else {
            count >= self.threshold
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthScorePolicy {
    pub name: &'static str,
    pub penalty_per_ticket: u32,
}

/// Asset list: `max(0, 100 - tickets * 5)`.
pub const ASSET_LIST_HEALTH: HealthScorePolicy = HealthScorePolicy {
    name: "asset-list",
    penalty_per_ticket: 5,
};

/// Asset detail: `max(0, 100 - tickets * 10)`.
pub const ASSET_DETAIL_HEALTH: HealthScorePolicy = HealthScorePolicy {
    name: "asset-detail",
    penalty_per_ticket: 10,
};

impl HealthScorePolicy {
    pub fn score(&self, ticket_count: usize) -> u32 {
        let count = u32::try_from(ticket_count).unwrap_or(u32::MAX);
        100u32.saturating_sub(count.saturating_mul(self.penalty_per_ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn mtbf_single_record_is_zero() {
        assert_eq!(mtbf_days(&[]), 0.0);
        assert_eq!(mtbf_days(&[at("2025-03-01T10:00:00+00:00")]), 0.0);
    }

    #[test]
    fn mtbf_two_records_ten_days_apart() {
        let history = [at("2025-03-11T10:00:00+00:00"), at("2025-03-01T10:00:00+00:00")];
        assert_eq!(mtbf_days(&history), 10.0);
    }

    #[test]
    fn mtbf_averages_over_gaps() {
        let history = [
            at("2025-03-21T00:00:00+00:00"),
            at("2025-03-05T00:00:00+00:00"),
            at("2025-03-01T00:00:00+00:00"),
        ];
        assert_eq!(mtbf_days(&history), 10.0);
    }

    #[test]
    fn mtbf_compares_instants_across_offsets() {
        // 20:00Z then 22:00Z; text order says the opposite
        let history = [at("2025-03-10T01:00:00+05:00"), at("2025-03-09T22:00:00+00:00")];
        let mtbf = mtbf_days(&history);
        assert!(mtbf > 0.0);
        assert!((mtbf - 2.0 / 24.0).abs() < 1e-9);
    }

    #[test]
    fn recurrence_policies_differ_at_three() {
        let now = at("2025-04-01T00:00:00+00:00");
        let three = [
            at("2025-03-30T00:00:00+00:00"),
            at("2025-03-20T00:00:00+00:00"),
            at("2025-03-10T00:00:00+00:00"),
        ];
        assert!(ASSET_DETAIL_RECURRENCE.is_recurring(&three, now));
        assert!(!ASSET_HISTORY_RECURRENCE.is_recurring(&three, now));
    }

    #[test]
    fn recurrence_windows_differ() {
        let now = at("2025-04-01T00:00:00+00:00");
        let spread = [
            at("2025-03-30T00:00:00+00:00"),
            at("2025-03-25T00:00:00+00:00"),
            at("2025-02-20T00:00:00+00:00"),
            at("2025-02-10T00:00:00+00:00"),
        ];
        assert_eq!(ASSET_DETAIL_RECURRENCE.count_in_window(&spread, now), 2);
        assert_eq!(ASSET_HISTORY_RECURRENCE.count_in_window(&spread, now), 4);
        assert!(!ASSET_DETAIL_RECURRENCE.is_recurring(&spread, now));
        assert!(ASSET_HISTORY_RECURRENCE.is_recurring(&spread, now));
    }

    #[test]
    fn health_scores_floor_at_zero() {
        assert_eq!(ASSET_LIST_HEALTH.score(0), 100);
        assert_eq!(ASSET_LIST_HEALTH.score(3), 85);
        assert_eq!(ASSET_DETAIL_HEALTH.score(3), 70);
        assert_eq!(ASSET_DETAIL_HEALTH.score(12), 0);
        assert_eq!(ASSET_LIST_HEALTH.score(usize::MAX), 0);
    }
}
