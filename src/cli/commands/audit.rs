use crate::cli::commands::{opt, print_or_empty};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::audit::{load_for_record, load_recent};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::models::audit::AuditLogEntry;
use crate::reports::{AuditDiff, audit_diff};
use crate::ui::messages::header;
use crate::utils::colors::{GREY, RESET};
use crate::utils::formatting::ellipsize;
use crate::utils::table::Table;
use serde_json::Value;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Audit { table, id, recent } = cmd else {
        return Ok(());
    };
    let pool = DbPool::open(&cfg.database)?;

    match (table, id) {
        (Some(table), Some(id)) => {
            header(format!("Audit trail of {table} #{id}"));
            let entries = load_for_record(&pool.conn, table, *id)?;
            if entries.is_empty() {
                println!("No audit rows for this record.");
            }
            for e in &entries {
                print_entry(e);
            }
        }
        (table, _) => {
            let entries: Vec<AuditLogEntry> = load_recent(&pool.conn, *recent)?
                .into_iter()
                .filter(|e| table.as_deref().is_none_or(|t| t == e.table_name))
                .collect();

            let mut t = Table::new(["ID", "When", "Table", "Record", "Action", "By", "Changes"]);
            for e in &entries {
                let diff = audit_diff(e.old_data.as_ref(), e.new_data.as_ref());
                t.add_row(vec![
                    e.id.to_string(),
                    e.created_at.clone(),
                    e.table_name.clone(),
                    e.record_id.to_string(),
                    e.action.to_db_str().to_string(),
                    opt(e.changed_by),
                    ellipsize(&diff.summary(), 50),
                ]);
            }
            print_or_empty(&t, "No audit rows yet.");
        }
    }
    Ok(())
}

fn print_entry(e: &AuditLogEntry) {
    println!(
        "#{} {} {} by {}",
        e.id,
        e.created_at,
        e.action.to_db_str(),
        opt(e.changed_by)
    );
    match audit_diff(e.old_data.as_ref(), e.new_data.as_ref()) {
        AuditDiff::Changes(changes) if !changes.is_empty() => {
            for c in changes {
                println!(
                    "  {}: {} → {}",
                    c.field,
                    show(c.old_value.as_ref()),
                    show(c.new_value.as_ref())
                );
            }
        }
        other => println!("  {GREY}{}{RESET}", other.summary()),
    }
}

fn show(v: Option<&Value>) -> String {
    match v {
        None => format!("{GREY}(none){RESET}"),
        Some(v) => v.to_string(),
    }
}
