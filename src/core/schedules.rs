use crate::db::log::oplog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries::schedules::{list_schedules, mark_done};
use crate::db::queries::tickets::{NewTicket, insert_ticket};
use crate::errors::AppResult;
use crate::models::ticket::TicketPriority;
use chrono::NaiveDate;

pub const PREVENTIVE_CATEGORY: &str = "preventive";

/// One schedule turned into a ticket by [`ScheduleLogic::run_due`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRun {
    pub schedule_id: i64,
    pub ticket_id: i64,
    pub next_due: NaiveDate,
}

pub struct ScheduleLogic;

impl ScheduleLogic {
    /// Open a preventive ticket for every active schedule due on or before
    /// `today`, and move each one to its next due date.
    pub fn run_due(pool: &DbPool, today: NaiveDate, by: Option<i64>) -> AppResult<Vec<ScheduleRun>> {
        let due: Vec<_> = list_schedules(&pool.conn, None)?
            .into_iter()
            .filter(|s| s.is_due(today))
            .collect();

        let tx = pool.conn.unchecked_transaction()?;
        let mut runs = Vec::with_capacity(due.len());

        for s in &due {
            let ticket_id = insert_ticket(
                &tx,
                &NewTicket {
                    asset_id: s.asset_id,
                    title: &s.title,
                    category: PREVENTIVE_CATEGORY,
                    priority: TicketPriority::Medium,
                    created_by: by,
                    created_at: None,
                },
            )?;
            let next_due = s.advance_from(today);
            mark_done(&tx, s.id, today, next_due)?;

            runs.push(ScheduleRun {
                schedule_id: s.id,
                ticket_id,
                next_due,
            });
        }

        tx.commit()?;

        for r in &runs {
            oplog_quiet(
                &pool.conn,
                "schedule_run",
                &format!("schedule #{}", r.schedule_id),
                &format!("opened ticket #{}, next due {}", r.ticket_id, r.next_due),
            );
        }
        Ok(runs)
    }
}
