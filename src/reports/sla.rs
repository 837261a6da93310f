//! Derived operational checks: overdue tickets and low stock.

use crate::models::spare_part::SparePart;
use crate::models::ticket::Ticket;
use crate::utils::time::age_hours;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlaBreach {
    pub ticket_id: i64,
    pub title: String,
    pub age_hours: i64,
}

/// Tickets still needing work whose age exceeds `threshold_hours`.
pub fn sla_breaches(
    tickets: &[Ticket],
    threshold_hours: i64,
    now: DateTime<FixedOffset>,
) -> Vec<SlaBreach> {
    tickets
        .iter()
        .filter(|t| !t.status.is_terminal())
        .filter_map(|t| {
            let age = age_hours(t.created_at, now);
            (age > threshold_hours).then(|| SlaBreach {
                ticket_id: t.id,
                title: t.title.clone(),
                age_hours: age,
            })
        })
        .collect()
}

pub fn low_stock(parts: &[SparePart], threshold: i64) -> Vec<&SparePart> {
    parts.iter().filter(|p| p.is_low_stock(threshold)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ticket::TicketStatus;
    use crate::reports::fixtures::ticket;

    #[test]
    fn only_open_work_past_threshold_breaches() {
        let now = DateTime::parse_from_rfc3339("2025-03-03T08:00:00+00:00").unwrap();
        let rows = vec![
            ticket(1, TicketStatus::Open, "2025-03-01T08:00:00+00:00", ""),
            ticket(2, TicketStatus::Closed, "2025-03-01T08:00:00+00:00", ""),
            ticket(3, TicketStatus::Assigned, "2025-03-02T08:00:00+00:00", ""),
            ticket(4, TicketStatus::OnHold, "2025-03-02T07:00:00+00:00", ""),
        ];

        let breaches = sla_breaches(&rows, 24, now);
        let ids: Vec<i64> = breaches.iter().map(|b| b.ticket_id).collect();
        assert_eq!(ids, vec![1, 4]);
        assert_eq!(breaches[0].age_hours, 48);
    }

    #[test]
    fn low_stock_includes_threshold() {
        let part = |id, stock| SparePart {
            id,
            name: format!("Part {id}"),
            sku: format!("P-{id}"),
            stock,
            unit_cost: 1.0,
        };
        let parts = vec![part(1, 5), part(2, 6), part(3, 0)];
        let low: Vec<i64> = low_stock(&parts, 5).iter().map(|p| p.id).collect();
        assert_eq!(low, vec![1, 3]);
    }
}
