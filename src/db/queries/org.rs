use super::found;
use crate::db::rows;
use crate::errors::{AppError, AppResult};
use crate::models::coordinates::Coordinates;
use crate::models::org::{Area, Branch, Brand, Sector};
use rusqlite::{Connection, Row, params};

pub fn insert_brand(conn: &Connection, name: &str) -> AppResult<i64> {
    conn.execute("INSERT INTO brands (name) VALUES (?1)", [name.trim()])?;
    Ok(conn.last_insert_rowid())
}

pub fn list_brands(conn: &Connection) -> AppResult<Vec<Brand>> {
    let mut stmt = conn.prepare("SELECT id, name FROM brands ORDER BY name ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Brand {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows::collect(rows)
}

pub struct NewBranch<'a> {
    pub brand_id: Option<i64>,
    pub name: &'a str,
    pub location: Option<Coordinates>,
    pub geofence_radius_meters: Option<f64>,
}

pub fn insert_branch(conn: &Connection, b: &NewBranch) -> AppResult<i64> {
    if let Some(loc) = b.location
        && !loc.is_valid()
    {
        return Err(AppError::InvalidInput(format!(
            "invalid coordinates {}, {}",
            loc.lat, loc.lng
        )));
    }

    conn.execute(
        "INSERT INTO branches (brand_id, name, lat, lng, geofence_radius_meters)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            b.brand_id,
            b.name.trim(),
            b.location.map(|c| c.lat),
            b.location.map(|c| c.lng),
            b.geofence_radius_meters,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn map_branch(row: &Row) -> rusqlite::Result<Branch> {
    let lat: Option<f64> = row.get("lat")?;
    let lng: Option<f64> = row.get("lng")?;

    if lat.is_some() != lng.is_some() {
        return Err(rows::invalid(
            "branches",
            "lat/lng",
            format!("{lat:?}/{lng:?}"),
        ));
    }

    Ok(Branch {
        id: row.get("id")?,
        brand_id: row.get("brand_id")?,
        name: row.get("name")?,
        location: Coordinates::from_columns(lat, lng),
        geofence_radius_meters: row.get("geofence_radius_meters")?,
    })
}

pub fn get_branch(conn: &Connection, id: i64) -> AppResult<Branch> {
    found(
        conn.query_row("SELECT * FROM branches WHERE id = ?1", [id], map_branch),
        "Branch",
        id,
    )
}

pub fn list_branches(conn: &Connection) -> AppResult<Vec<Branch>> {
    let mut stmt = conn.prepare("SELECT * FROM branches ORDER BY id ASC")?;
    let rows = stmt.query_map([], map_branch)?;
    rows::collect(rows)
}

pub fn insert_sector(conn: &Connection, name: &str) -> AppResult<i64> {
    conn.execute("INSERT INTO sectors (name) VALUES (?1)", [name.trim()])?;
    Ok(conn.last_insert_rowid())
}

pub fn list_sectors(conn: &Connection) -> AppResult<Vec<Sector>> {
    let mut stmt = conn.prepare("SELECT id, name FROM sectors ORDER BY name ASC")?;
    let rows = stmt.query_map([], |row| {
        Ok(Sector {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    })?;
    rows::collect(rows)
}

pub fn insert_area(conn: &Connection, sector_id: i64, name: &str) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO areas (sector_id, name) VALUES (?1, ?2)",
        params![sector_id, name.trim()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_areas(conn: &Connection, sector_id: Option<i64>) -> AppResult<Vec<Area>> {
    let mut stmt = conn.prepare(
        "SELECT id, sector_id, name FROM areas
         WHERE ?1 IS NULL OR sector_id = ?1
         ORDER BY sector_id ASC, name ASC",
    )?;
    let rows = stmt.query_map([sector_id], |row| {
        Ok(Area {
            id: row.get(0)?,
            sector_id: row.get(1)?,
            name: row.get(2)?,
        })
    })?;
    rows::collect(rows)
}
