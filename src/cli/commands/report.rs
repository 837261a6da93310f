use crate::cli::commands::{print_or_empty, range_or_current_month, require_user};
use crate::cli::parser::{Commands, ReportKind};
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::db::stats::{spending_trend, technician_performance};
use crate::errors::AppResult;
use crate::ui::messages::header;
use crate::utils::formatting::money;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config, acting_as: Option<i64>) -> AppResult<()> {
    let Commands::Report { kind } = cmd else {
        return Ok(());
    };
    let user_id = require_user(acting_as)?;
    let pool = DbPool::open(&cfg.database)?;

    match kind {
        ReportKind::Spending { range } => {
            let (from, to) = range_or_current_month(range.as_deref())?;
            header(format!("Spending {from} → {to}"));

            let rows = spending_trend(&pool.conn, user_id, from, to)?;
            let mut t = Table::new(["Month", "Parts", "Tickets", "Total"]);
            for r in &rows {
                t.add_row(vec![
                    r.month.clone(),
                    money(r.parts_cost),
                    money(r.ticket_cost),
                    money(r.total()),
                ]);
            }
            print_or_empty(&t, "No spending in this period.");
        }

        ReportKind::Performance { range } => {
            let (from, to) = range_or_current_month(range.as_deref())?;
            header(format!("Technician performance {from} → {to}"));

            let rows = technician_performance(&pool.conn, user_id, from, to)?;
            let mut t = Table::new(["ID", "Technician", "Assigned", "Closed", "Avg resolution"]);
            for r in &rows {
                t.add_row(vec![
                    r.technician_id.to_string(),
                    r.name.clone(),
                    r.assigned.to_string(),
                    r.closed.to_string(),
                    r.avg_resolution_hours
                        .map(|h| format!("{h:.1}h"))
                        .unwrap_or_else(|| "--".into()),
                ]);
            }
            print_or_empty(&t, "No technicians found.");
        }
    }
    Ok(())
}
