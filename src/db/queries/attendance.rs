use crate::db::rows;
use crate::errors::AppResult;
use crate::models::attendance::{AttendanceEvent, AttendanceKind};
use crate::models::coordinates::PositionSample;
use crate::utils::time::now_iso;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

const TABLE: &str = "attendance";

fn map_row(row: &Row) -> rusqlite::Result<AttendanceEvent> {
    let kind_str: String = row.get("kind")?;
    let kind =
        AttendanceKind::from_db_str(&kind_str).ok_or_else(|| rows::invalid(TABLE, "kind", &kind_str))?;

    Ok(AttendanceEvent {
        id: row.get("id")?,
        profile_id: row.get("profile_id")?,
        branch_id: row.get("branch_id")?,
        kind,
        lat: row.get("lat")?,
        lng: row.get("lng")?,
        distance_meters: row.get("distance_meters")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_attendance(
    conn: &Connection,
    profile_id: i64,
    branch_id: i64,
    kind: AttendanceKind,
    sample: &PositionSample,
    distance_meters: Option<f64>,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO attendance (profile_id, branch_id, kind, lat, lng, distance_meters, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            profile_id,
            branch_id,
            kind.to_db_str(),
            sample.lat,
            sample.lng,
            distance_meters,
            now_iso()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent attendance event of a technician.
pub fn last_for_profile(conn: &Connection, profile_id: i64) -> AppResult<Option<AttendanceEvent>> {
    let ev = conn
        .query_row(
            "SELECT * FROM attendance WHERE profile_id = ?1 ORDER BY id DESC LIMIT 1",
            [profile_id],
            map_row,
        )
        .optional()
        .map_err(rows::surface)?;
    Ok(ev)
}

pub fn list_attendance(
    conn: &Connection,
    profile_id: Option<i64>,
    between: Option<(NaiveDate, NaiveDate)>,
) -> AppResult<Vec<AttendanceEvent>> {
    let (from, to) = match between {
        Some((a, b)) => (
            Some(a.format("%Y-%m-%d").to_string()),
            Some(b.format("%Y-%m-%d").to_string()),
        ),
        None => (None, None),
    };

    let mut stmt = conn.prepare(
        "SELECT * FROM attendance
         WHERE (?1 IS NULL OR profile_id = ?1)
           AND (?2 IS NULL OR substr(created_at, 1, 10) >= ?2)
           AND (?3 IS NULL OR substr(created_at, 1, 10) <= ?3)
         ORDER BY created_at ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![profile_id, from, to], map_row)?;
    rows::collect(rows)
}
