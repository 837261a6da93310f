use crate::db::rows;
use crate::errors::AppResult;
use crate::models::audit::{AuditAction, AuditLogEntry};
use crate::utils::time::now_iso;
use rusqlite::{Connection, Row, params};
use serde_json::Value;

const TABLE: &str = "audit_logs";

/// Store the before/after images of a changed record.
pub fn record(
    conn: &Connection,
    table_name: &str,
    record_id: i64,
    action: AuditAction,
    old_data: Option<&Value>,
    new_data: Option<&Value>,
    changed_by: Option<i64>,
) -> AppResult<()> {
    let old = old_data.map(serde_json::to_string).transpose()?;
    let new = new_data.map(serde_json::to_string).transpose()?;

    conn.execute(
        "INSERT INTO audit_logs (table_name, record_id, action, old_data, new_data, changed_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            table_name,
            record_id,
            action.to_db_str(),
            old,
            new,
            changed_by,
            now_iso()
        ],
    )?;
    Ok(())
}

fn map_row(row: &Row) -> rusqlite::Result<AuditLogEntry> {
    let action_str: String = row.get("action")?;
    let action = AuditAction::from_db_str(&action_str)
        .ok_or_else(|| rows::invalid(TABLE, "action", &action_str))?;

    Ok(AuditLogEntry {
        id: row.get("id")?,
        table_name: row.get("table_name")?,
        record_id: row.get("record_id")?,
        action,
        old_data: rows::json(TABLE, "old_data", row.get("old_data")?)?,
        new_data: rows::json(TABLE, "new_data", row.get("new_data")?)?,
        changed_by: row.get("changed_by")?,
        created_at: row.get("created_at")?,
    })
}

/// Audit trail of one record, oldest first.
pub fn load_for_record(
    conn: &Connection,
    table_name: &str,
    record_id: i64,
) -> AppResult<Vec<AuditLogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM audit_logs
         WHERE table_name = ?1 AND record_id = ?2
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![table_name, record_id], map_row)?;
    rows::collect(rows)
}

/// Latest audit rows across all tables, newest first.
pub fn load_recent(conn: &Connection, limit: usize) -> AppResult<Vec<AuditLogEntry>> {
    let mut stmt = conn.prepare("SELECT * FROM audit_logs ORDER BY id DESC LIMIT ?1")?;
    let rows = stmt.query_map([limit as i64], map_row)?;
    rows::collect(rows)
}
