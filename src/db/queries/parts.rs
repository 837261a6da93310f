use super::{atomic, found};
use crate::db::{audit, rows};
use crate::errors::{AppError, AppResult};
use crate::models::audit::AuditAction;
use crate::models::spare_part::SparePart;
use rusqlite::{Connection, Row, params};

const TABLE: &str = "spare_parts";

fn map_row(row: &Row) -> rusqlite::Result<SparePart> {
    let stock: i64 = row.get("stock")?;
    if stock < 0 {
        return Err(rows::invalid(TABLE, "stock", stock));
    }

    Ok(SparePart {
        id: row.get("id")?,
        name: row.get("name")?,
        sku: row.get("sku")?,
        stock,
        unit_cost: row.get("unit_cost")?,
    })
}

pub fn insert_part(
    conn: &Connection,
    name: &str,
    sku: &str,
    stock: i64,
    unit_cost: f64,
    changed_by: Option<i64>,
) -> AppResult<i64> {
    if stock < 0 || unit_cost < 0.0 || !unit_cost.is_finite() {
        return Err(AppError::InvalidInput(
            "stock and unit cost must be non-negative".into(),
        ));
    }

    atomic(conn, |tx| {
        tx.execute(
            "INSERT INTO spare_parts (name, sku, stock, unit_cost) VALUES (?1, ?2, ?3, ?4)",
            params![name.trim(), sku.trim().to_uppercase(), stock, unit_cost],
        )?;
        let id = tx.last_insert_rowid();

        let created = get_part(tx, id)?;
        audit::record(
            tx,
            TABLE,
            id,
            AuditAction::Insert,
            None,
            Some(&serde_json::to_value(&created)?),
            changed_by,
        )?;
        Ok(id)
    })
}

pub fn get_part(conn: &Connection, id: i64) -> AppResult<SparePart> {
    found(
        conn.query_row("SELECT * FROM spare_parts WHERE id = ?1", [id], map_row),
        "Spare part",
        id,
    )
}

pub fn list_parts(conn: &Connection) -> AppResult<Vec<SparePart>> {
    let mut stmt = conn.prepare("SELECT * FROM spare_parts ORDER BY name ASC")?;
    let rows = stmt.query_map([], map_row)?;
    rows::collect(rows)
}

/// Add (positive delta) or consume (negative delta) stock.
pub fn adjust_stock(
    conn: &Connection,
    id: i64,
    delta: i64,
    changed_by: Option<i64>,
) -> AppResult<SparePart> {
    atomic(conn, |tx| {
        let before = get_part(tx, id)?;
        let new_stock = before.stock + delta;
        if new_stock < 0 {
            return Err(AppError::InvalidInput(format!(
                "stock of '{}' cannot go below zero",
                before.name
            )));
        }

        tx.execute(
            "UPDATE spare_parts SET stock = ?1 WHERE id = ?2",
            params![new_stock, id],
        )?;

        let after = get_part(tx, id)?;
        audit::record(
            tx,
            TABLE,
            id,
            AuditAction::Update,
            Some(&serde_json::to_value(&before)?),
            Some(&serde_json::to_value(&after)?),
            changed_by,
        )?;
        Ok(after)
    })
}
