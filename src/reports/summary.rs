use super::distribution::{DistributionEntry, category_distribution, status_distribution};
use crate::models::ticket::{Ticket, TicketStatus};
use serde::Serialize;

/// Closed tickets whose last update falls on `today`.
///
/// Both sides are compared as `YYYY-MM-DD` prefixes of the stored text, so
/// a ticket updated late in the evening under another offset may land on
/// the neighbouring day.
pub fn closed_today(tickets: &[Ticket], today: &str) -> usize {
    let Some(day) = today.get(..10) else {
        return 0;
    };
    tickets
        .iter()
        .filter(|t| t.status == TicketStatus::Closed)
        .filter(|t| t.updated_at.get(..10) == Some(day))
        .count()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSummary {
    pub total: usize,
    pub open: usize,
    pub emergency: usize,
    pub closed_today: usize,
    pub by_status: Vec<DistributionEntry>,
    pub by_category: Vec<DistributionEntry>,
}

impl StatsSummary {
    pub fn from_tickets(tickets: &[Ticket], today: &str) -> Self {
        Self {
            total: tickets.len(),
            open: tickets.iter().filter(|t| !t.status.is_terminal()).count(),
            emergency: tickets
                .iter()
                .filter(|t| t.is_emergency() && t.status != TicketStatus::Closed)
                .count(),
            closed_today: closed_today(tickets, today),
            by_status: status_distribution(tickets),
            by_category: category_distribution(tickets),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ticket::TicketPriority;
    use crate::reports::fixtures::ticket;

    const CREATED: &str = "2025-03-01T08:00:00+02:00";

    #[test]
    fn closed_today_compares_date_prefixes() {
        let rows = vec![
            ticket(1, TicketStatus::Closed, CREATED, "2025-03-04T23:10:00+02:00"),
            ticket(2, TicketStatus::Closed, CREATED, "2025-03-03T09:00:00+02:00"),
            ticket(3, TicketStatus::Open, CREATED, "2025-03-04T10:00:00+02:00"),
        ];
        assert_eq!(closed_today(&rows, "2025-03-04"), 1);
        assert_eq!(closed_today(&rows, "2025-03-04T00:00:00+00:00"), 1);
        assert_eq!(closed_today(&rows, "bad"), 0);
    }

    #[test]
    fn summary_counts() {
        let mut urgent = ticket(4, TicketStatus::InProgress, CREATED, CREATED);
        urgent.priority = TicketPriority::Emergency;
        let mut urgent_closed = ticket(5, TicketStatus::Closed, CREATED, "2025-03-04T12:00:00+02:00");
        urgent_closed.priority = TicketPriority::Emergency;

        let rows = vec![
            ticket(1, TicketStatus::Open, CREATED, CREATED),
            ticket(2, TicketStatus::Cancelled, CREATED, CREATED),
            ticket(3, TicketStatus::OnHold, CREATED, CREATED),
            urgent,
            urgent_closed,
        ];

        let s = StatsSummary::from_tickets(&rows, "2025-03-04");
        assert_eq!(s.total, 5);
        assert_eq!(s.open, 3);
        assert_eq!(s.emergency, 1);
        assert_eq!(s.closed_today, 1);
        assert_eq!(s.by_status.len(), 5);
        assert_eq!(s.by_category.len(), 1);
        assert_eq!(s.by_category[0].count, 5);
    }

    #[test]
    fn empty_summary() {
        let s = StatsSummary::from_tickets(&[], "2025-03-04");
        assert!(s.is_empty());
        assert_eq!(s, StatsSummary::default());
    }
}
