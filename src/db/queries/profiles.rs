use super::found;
use crate::db::rows;
use crate::errors::AppResult;
use crate::models::coordinates::{Coordinates, PositionSample};
use crate::models::profile::{Profile, Role};
use chrono::Local;
use rusqlite::{Connection, Row, params};

const TABLE: &str = "profiles";

fn map_row(row: &Row) -> rusqlite::Result<Profile> {
    let role_str: String = row.get("role")?;
    let role = Role::from_db_str(&role_str).ok_or_else(|| rows::invalid(TABLE, "role", &role_str))?;

    Ok(Profile {
        id: row.get("id")?,
        name: row.get("name")?,
        role,
        last_location: Coordinates::from_columns(row.get("last_lat")?, row.get("last_lng")?),
        last_seen: row.get("last_seen")?,
    })
}

pub fn insert_profile(conn: &Connection, name: &str, role: Role) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO profiles (name, role) VALUES (?1, ?2)",
        params![name.trim(), role.to_db_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_profile(conn: &Connection, id: i64) -> AppResult<Profile> {
    found(
        conn.query_row("SELECT * FROM profiles WHERE id = ?1", [id], map_row),
        "Profile",
        id,
    )
}

pub fn list_profiles(conn: &Connection, role: Option<Role>) -> AppResult<Vec<Profile>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM profiles
         WHERE ?1 IS NULL OR role = ?1
         ORDER BY name ASC",
    )?;
    let rows = stmt.query_map([role.map(|r| r.to_db_str())], map_row)?;
    rows::collect(rows)
}

/// Record the last position reported by a technician's device.
pub fn update_last_location(conn: &Connection, id: i64, sample: &PositionSample) -> AppResult<()> {
    let seen = sample.timestamp.with_timezone(&Local).to_rfc3339();
    let changed = conn.execute(
        "UPDATE profiles SET last_lat = ?1, last_lng = ?2, last_seen = ?3 WHERE id = ?4",
        params![sample.lat, sample.lng, seen, id],
    )?;
    if changed == 0 {
        return Err(crate::errors::AppError::NotFound {
            entity: "Profile",
            id,
        });
    }
    Ok(())
}
