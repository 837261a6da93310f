use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

/// Ensure that the `log` table exists: it also records applied migrations.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

struct Migration {
    version: &'static str,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_organisation",
        description: "Created brands, branches, sectors and areas",
        sql: r#"
        CREATE TABLE IF NOT EXISTS brands (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            name  TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS branches (
            id                     INTEGER PRIMARY KEY AUTOINCREMENT,
            brand_id               INTEGER REFERENCES brands(id),
            name                   TEXT NOT NULL,
            lat                    REAL,
            lng                    REAL,
            geofence_radius_meters REAL
        );

        CREATE TABLE IF NOT EXISTS sectors (
            id    INTEGER PRIMARY KEY AUTOINCREMENT,
            name  TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS areas (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            sector_id  INTEGER NOT NULL REFERENCES sectors(id),
            name       TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20250301_0002_assets_profiles",
        description: "Created assets and profiles",
        sql: r#"
        CREATE TABLE IF NOT EXISTS assets (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            branch_id      INTEGER NOT NULL REFERENCES branches(id),
            area_id        INTEGER REFERENCES areas(id),
            name           TEXT NOT NULL,
            category       TEXT NOT NULL DEFAULT 'general',
            serial         TEXT,
            status         TEXT NOT NULL DEFAULT 'active',
            specification  TEXT,
            created_at     TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_assets_branch ON assets(branch_id);

        CREATE TABLE IF NOT EXISTS profiles (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL,
            role       TEXT NOT NULL CHECK(role IN ('admin','manager','technician')),
            last_lat   REAL,
            last_lng   REAL,
            last_seen  TEXT
        );
        "#,
    },
    Migration {
        version: "20250301_0003_tickets",
        description: "Created tickets",
        sql: r#"
        CREATE TABLE IF NOT EXISTS tickets (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_id     INTEGER NOT NULL REFERENCES assets(id),
            branch_id    INTEGER NOT NULL REFERENCES branches(id),
            title        TEXT NOT NULL,
            category     TEXT NOT NULL DEFAULT 'general',
            priority     TEXT NOT NULL DEFAULT 'medium'
                         CHECK(priority IN ('low','medium','high','emergency')),
            status       TEXT NOT NULL DEFAULT 'open'
                         CHECK(status IN ('open','assigned','in_progress','on_hold','closed','cancelled')),
            assigned_to  INTEGER REFERENCES profiles(id),
            created_by   INTEGER REFERENCES profiles(id),
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL,
            closed_at    TEXT,
            cost         REAL NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_tickets_asset_created ON tickets(asset_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
        "#,
    },
    Migration {
        version: "20250301_0004_spare_parts",
        description: "Created spare_parts and ticket_parts",
        sql: r#"
        CREATE TABLE IF NOT EXISTS spare_parts (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            name       TEXT NOT NULL,
            sku        TEXT NOT NULL UNIQUE,
            stock      INTEGER NOT NULL DEFAULT 0 CHECK(stock >= 0),
            unit_cost  REAL NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS ticket_parts (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            ticket_id  INTEGER NOT NULL REFERENCES tickets(id),
            part_id    INTEGER NOT NULL REFERENCES spare_parts(id),
            quantity   INTEGER NOT NULL CHECK(quantity > 0),
            unit_cost  REAL NOT NULL,
            created_at TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20250301_0005_schedules_attendance",
        description: "Created maintenance_schedules and attendance",
        sql: r#"
        CREATE TABLE IF NOT EXISTS maintenance_schedules (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            asset_id        INTEGER NOT NULL REFERENCES assets(id),
            title           TEXT NOT NULL,
            frequency_days  INTEGER NOT NULL CHECK(frequency_days > 0),
            next_due        TEXT NOT NULL,
            last_done       TEXT,
            active          INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS attendance (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            profile_id       INTEGER NOT NULL REFERENCES profiles(id),
            branch_id        INTEGER NOT NULL REFERENCES branches(id),
            kind             TEXT NOT NULL CHECK(kind IN ('check_in','check_out')),
            lat              REAL NOT NULL,
            lng              REAL NOT NULL,
            distance_meters  REAL,
            created_at       TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_attendance_profile ON attendance(profile_id, created_at);
        "#,
    },
    Migration {
        version: "20250301_0006_audit_settings",
        description: "Created audit_logs and app_settings",
        sql: r#"
        CREATE TABLE IF NOT EXISTS audit_logs (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            table_name  TEXT NOT NULL,
            record_id   INTEGER NOT NULL,
            action      TEXT NOT NULL CHECK(action IN ('insert','update','delete')),
            old_data    TEXT,
            new_data    TEXT,
            changed_by  INTEGER,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_audit_record ON audit_logs(table_name, record_id);

        CREATE TABLE IF NOT EXISTS app_settings (
            key    TEXT PRIMARY KEY,
            value  TEXT NOT NULL
        );
        "#,
    },
];

fn is_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> AppResult<()> {
    conn.execute_batch(&format!("BEGIN;\n{}\nCOMMIT;", m.sql))
        .map_err(|e| {
            let _ = conn.execute_batch("ROLLBACK;");
            AppError::Migration(format!("{}: {}", m.version, e))
        })?;

    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        params![m.version, m.description],
    )?;

    Ok(())
}

/// Versions of all known migrations, in application order.
pub fn known_versions() -> Vec<&'static str> {
    MIGRATIONS.iter().map(|m| m.version).collect()
}

/// Public entry point: run all pending migrations.
///
/// Invocata da DbPool::open() e da `db --migrate`.
pub fn run_pending_migrations(conn: &Connection) -> AppResult<usize> {
    ensure_log_table(conn)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    let mut applied = 0;
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            debug!(version = m.version, "migration already applied");
            continue;
        }

        apply(conn, m)?;
        success(format!("Migration applied: {} → {}", m.version, m.description));
        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        assert_eq!(run_pending_migrations(&conn).unwrap(), MIGRATIONS.len());
        assert_eq!(run_pending_migrations(&conn).unwrap(), 0);

        let recorded: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(recorded as usize, known_versions().len());
    }
}
