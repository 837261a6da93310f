//! Key/value settings store (`app_settings`).
//!
//! Values are stored as strings; typed accessors validate them on read.

use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::geofence::{GEOFENCE_SETTINGS_KEY, GeofenceConfig};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;

pub const SLA_THRESHOLD_KEY: &str = "sla_threshold_hours";
pub const LOW_STOCK_THRESHOLD_KEY: &str = "low_stock_threshold";

pub const DEFAULT_SLA_THRESHOLD_HOURS: i64 = 24;
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

/// Anything able to answer a settings lookup.
pub trait SettingsSource {
    fn get_setting(&self, key: &str) -> AppResult<Option<String>>;
}

impl SettingsSource for Connection {
    fn get_setting(&self, key: &str) -> AppResult<Option<String>> {
        let value = self
            .query_row(
                "SELECT value FROM app_settings WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl SettingsSource for DbPool {
    fn get_setting(&self, key: &str) -> AppResult<Option<String>> {
        self.conn.get_setting(key)
    }
}

impl SettingsSource for HashMap<String, String> {
    fn get_setting(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.get(key).cloned())
    }
}

/// Validate a value before it is written for one of the known keys.
/// Unknown keys are stored as-is.
pub fn validate(key: &str, value: &str) -> AppResult<()> {
    match key {
        GEOFENCE_SETTINGS_KEY => {
            GeofenceConfig::parse(value).map_err(|e| AppError::InvalidInput(e.to_string()))?;
        }
        SLA_THRESHOLD_KEY | LOW_STOCK_THRESHOLD_KEY => {
            let n: i64 = value.trim().parse().map_err(|_| {
                AppError::InvalidInput(format!("{key} must be an integer, got '{value}'"))
            })?;
            if n < 0 {
                return Err(AppError::InvalidInput(format!("{key} must be >= 0")));
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> AppResult<()> {
    validate(key, value)?;
    conn.execute(
        "INSERT INTO app_settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value.trim()],
    )?;
    Ok(())
}

pub fn list_settings(conn: &Connection) -> AppResult<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM app_settings ORDER BY key ASC")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    crate::db::rows::collect(rows)
}

fn integer_setting<S: SettingsSource + ?Sized>(src: &S, key: &str, default: i64) -> AppResult<i64> {
    match src.get_setting(key)? {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| AppError::Schema {
            table: "app_settings",
            detail: format!("{key}: expected an integer, got '{raw}'"),
        }),
    }
}

pub fn sla_threshold_hours<S: SettingsSource + ?Sized>(src: &S) -> AppResult<i64> {
    integer_setting(src, SLA_THRESHOLD_KEY, DEFAULT_SLA_THRESHOLD_HOURS)
}

pub fn low_stock_threshold<S: SettingsSource + ?Sized>(src: &S) -> AppResult<i64> {
    integer_setting(src, LOW_STOCK_THRESHOLD_KEY, DEFAULT_LOW_STOCK_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_default_when_missing() {
        let pool = DbPool::in_memory().unwrap();
        assert_eq!(sla_threshold_hours(&pool).unwrap(), 24);
        assert_eq!(low_stock_threshold(&pool).unwrap(), 5);
    }

    #[test]
    fn set_then_read_back() {
        let pool = DbPool::in_memory().unwrap();
        set_setting(&pool.conn, SLA_THRESHOLD_KEY, "48").unwrap();
        set_setting(&pool.conn, SLA_THRESHOLD_KEY, "12").unwrap();
        assert_eq!(sla_threshold_hours(&pool).unwrap(), 12);
        assert_eq!(list_settings(&pool.conn).unwrap().len(), 1);
    }

    #[test]
    fn known_keys_are_validated() {
        let pool = DbPool::in_memory().unwrap();
        assert!(set_setting(&pool.conn, LOW_STOCK_THRESHOLD_KEY, "a few").is_err());
        assert!(set_setting(&pool.conn, GEOFENCE_SETTINGS_KEY, "{\"enabled\":true}").is_err());
        assert!(
            set_setting(
                &pool.conn,
                GEOFENCE_SETTINGS_KEY,
                "{\"radius_meters\":150,\"enabled\":true}"
            )
            .is_ok()
        );
        assert!(set_setting(&pool.conn, "theme", "dark").is_ok());
    }

    #[test]
    fn stored_garbage_is_a_schema_error() {
        let pool = DbPool::in_memory().unwrap();
        pool.conn
            .execute(
                "INSERT INTO app_settings (key, value) VALUES (?1, 'soon')",
                [SLA_THRESHOLD_KEY],
            )
            .unwrap();
        assert!(matches!(
            sla_threshold_hours(&pool),
            Err(AppError::Schema { .. })
        ));
    }
}
