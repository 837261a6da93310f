use crate::db::rows;
use crate::errors::{AppError, AppResult};
use crate::models::schedule::MaintenanceSchedule;
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};

const TABLE: &str = "maintenance_schedules";

fn map_row(row: &Row) -> rusqlite::Result<MaintenanceSchedule> {
    let next_due: String = row.get("next_due")?;
    let last_done: Option<String> = row.get("last_done")?;

    Ok(MaintenanceSchedule {
        id: row.get("id")?,
        asset_id: row.get("asset_id")?,
        title: row.get("title")?,
        frequency_days: row.get("frequency_days")?,
        next_due: rows::date(TABLE, "next_due", &next_due)?,
        last_done: last_done
            .map(|d| rows::date(TABLE, "last_done", &d))
            .transpose()?,
        active: row.get::<_, i64>("active")? == 1,
    })
}

pub fn insert_schedule(
    conn: &Connection,
    asset_id: i64,
    title: &str,
    frequency_days: i64,
    first_due: NaiveDate,
) -> AppResult<i64> {
    if frequency_days <= 0 {
        return Err(AppError::InvalidInput(
            "frequency must be at least one day".into(),
        ));
    }

    conn.execute(
        "INSERT INTO maintenance_schedules (asset_id, title, frequency_days, next_due)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            asset_id,
            title.trim(),
            frequency_days,
            first_due.format("%Y-%m-%d").to_string()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_schedules(conn: &Connection, asset_id: Option<i64>) -> AppResult<Vec<MaintenanceSchedule>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM maintenance_schedules
         WHERE ?1 IS NULL OR asset_id = ?1
         ORDER BY next_due ASC, id ASC",
    )?;
    let rows = stmt.query_map([asset_id], map_row)?;
    rows::collect(rows)
}

pub fn mark_done(
    conn: &Connection,
    id: i64,
    done_on: NaiveDate,
    next_due: NaiveDate,
) -> AppResult<()> {
    conn.execute(
        "UPDATE maintenance_schedules SET last_done = ?1, next_due = ?2 WHERE id = ?3",
        params![
            done_on.format("%Y-%m-%d").to_string(),
            next_due.format("%Y-%m-%d").to_string(),
            id
        ],
    )?;
    Ok(())
}

pub fn set_active(conn: &Connection, id: i64, active: bool) -> AppResult<()> {
    let changed = conn.execute(
        "UPDATE maintenance_schedules SET active = ?1 WHERE id = ?2",
        params![active as i64, id],
    )?;
    if changed == 0 {
        return Err(AppError::NotFound {
            entity: "Schedule",
            id,
        });
    }
    Ok(())
}
