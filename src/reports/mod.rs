//! Pure summary views over in-memory rows.
//!
//! Nothing here touches the store: every function takes rows already
//! loaded and returns figures for display. Same input, same output.

pub mod audit_diff;
pub mod distribution;
pub mod reliability;
pub mod sla;
pub mod summary;

pub use audit_diff::{AuditDiff, FieldChange, audit_diff};
pub use distribution::{DistributionEntry, category_distribution, group_counts, status_distribution};
pub use reliability::{
    ASSET_DETAIL_HEALTH, ASSET_DETAIL_RECURRENCE, ASSET_HISTORY_RECURRENCE, ASSET_LIST_HEALTH,
    HealthScorePolicy, RecurringFaultPolicy, mtbf_days,
};
pub use sla::{SlaBreach, low_stock, sla_breaches};
pub use summary::{StatsSummary, closed_today};

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::ticket::{Ticket, TicketPriority, TicketStatus};
    use chrono::DateTime;

    pub fn ticket(id: i64, status: TicketStatus, created: &str, updated: &str) -> Ticket {
        Ticket {
            id,
            asset_id: 1,
            branch_id: 1,
            title: format!("Ticket {id}"),
            category: "hvac".into(),
            priority: TicketPriority::Medium,
            status,
            assigned_to: None,
            created_by: None,
            created_at: DateTime::parse_from_rfc3339(created).unwrap(),
            updated_at: updated.into(),
            closed_at: None,
            cost: 0.0,
        }
    }
}
