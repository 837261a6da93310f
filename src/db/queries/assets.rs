use super::{atomic, found};
use crate::db::{audit, rows};
use crate::errors::AppResult;
use crate::models::asset::Asset;
use crate::models::audit::AuditAction;
use crate::utils::time::now_iso;
use rusqlite::{Connection, Row, params};
use serde_json::Value;
use std::collections::HashMap;

const TABLE: &str = "assets";

pub struct NewAsset<'a> {
    pub branch_id: i64,
    pub area_id: Option<i64>,
    pub name: &'a str,
    pub category: &'a str,
    pub serial: Option<&'a str>,
    /// Already validated with `models::asset::parse_specification`.
    pub specification: Option<&'a Value>,
}

fn map_row(row: &Row) -> rusqlite::Result<Asset> {
    Ok(Asset {
        id: row.get("id")?,
        branch_id: row.get("branch_id")?,
        area_id: row.get("area_id")?,
        name: row.get("name")?,
        category: row.get("category")?,
        serial: row.get("serial")?,
        status: row.get("status")?,
        specification: rows::json(TABLE, "specification", row.get("specification")?)?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_asset(conn: &Connection, a: &NewAsset, changed_by: Option<i64>) -> AppResult<i64> {
    atomic(conn, |tx| {
        let spec = a.specification.map(serde_json::to_string).transpose()?;

        tx.execute(
            "INSERT INTO assets (branch_id, area_id, name, category, serial, specification, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                a.branch_id,
                a.area_id,
                a.name.trim(),
                a.category.trim().to_lowercase(),
                a.serial,
                spec,
                now_iso()
            ],
        )?;
        let id = tx.last_insert_rowid();

        let created = get_asset(tx, id)?;
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

pub fn get_asset(conn: &Connection, id: i64) -> AppResult<Asset> {
    found(
        conn.query_row("SELECT * FROM assets WHERE id = ?1", [id], map_row),
        "Asset",
        id,
    )
}

pub fn list_assets(conn: &Connection, branch_id: Option<i64>) -> AppResult<Vec<Asset>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM assets
         WHERE ?1 IS NULL OR branch_id = ?1
         ORDER BY branch_id ASC, name ASC",
    )?;
    let rows = stmt.query_map([branch_id], map_row)?;
    rows::collect(rows)
}

/// Replace the mutable fields of an asset, auditing the change.
pub fn update_asset(conn: &Connection, updated: &Asset, changed_by: Option<i64>) -> AppResult<()> {
    atomic(conn, |tx| {
        let before = get_asset(tx, updated.id)?;
        let spec = updated
            .specification
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        tx.execute(
            "UPDATE assets
             SET area_id = ?1, name = ?2, category = ?3, serial = ?4, status = ?5, specification = ?6
             WHERE id = ?7",
            params![
                updated.area_id,
                updated.name,
                updated.category,
                updated.serial,
                updated.status,
                spec,
                updated.id
            ],
        )?;

        let after = get_asset(tx, updated.id)?;
        audit::record(
            tx,
            TABLE,
            updated.id,
            AuditAction::Update,
            Some(&serde_json::to_value(&before)?),
            Some(&serde_json::to_value(&after)?),
            changed_by,
        )?;
        Ok(())
    })
}

/// Number of tickets ever opened per asset.
pub fn ticket_counts(conn: &Connection) -> AppResult<HashMap<i64, usize>> {
    let mut stmt = conn.prepare("SELECT asset_id, COUNT(*) FROM tickets GROUP BY asset_id")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? as usize))
    })?;
    Ok(rows::collect(rows)?.into_iter().collect())
}
