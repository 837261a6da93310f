//! Aggregate procedures and database info.
//!
//! The three procedures take the requesting user and an inclusive date
//! range, and return pre-aggregated rows. Technicians only see tickets
//! assigned to them; admins and managers see everything.

use crate::db::pool::DbPool;
use crate::db::queries::profiles::get_profile;
use crate::db::rows;
use crate::errors::AppResult;
use crate::models::ticket::TicketStatus;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCountRow {
    pub status: TicketStatus,
    pub count: i64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingRow {
    pub month: String, // YYYY-MM
    pub parts_cost: f64,
    pub ticket_cost: f64,
}

impl SpendingRow {
    pub fn total(&self) -> f64 {
        self.parts_cost + self.ticket_cost
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    pub technician_id: i64,
    pub name: String,
    pub assigned: i64,
    pub closed: i64,
    pub avg_resolution_hours: Option<f64>,
}

fn day(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// `Some(user_id)` when the user must be restricted to their own tickets.
fn scope(conn: &Connection, user_id: i64) -> AppResult<Option<i64>> {
    let profile = get_profile(conn, user_id)?;
    Ok((!profile.role.sees_everything()).then_some(profile.id))
}

pub fn dashboard_stats(
    conn: &Connection,
    user_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<StatusCountRow>> {
    let only = scope(conn, user_id)?;

    let mut stmt = conn.prepare(
        "SELECT status, COUNT(*), COALESCE(SUM(cost), 0)
         FROM tickets
         WHERE substr(created_at, 1, 10) BETWEEN ?1 AND ?2
           AND (?3 IS NULL OR assigned_to = ?3)
         GROUP BY status
         ORDER BY status ASC",
    )?;

    let rows = stmt.query_map(params![day(from), day(to), only], |row| {
        let status_str: String = row.get(0)?;
        let status = TicketStatus::from_db_str(&status_str)
            .ok_or_else(|| rows::invalid("tickets", "status", &status_str))?;
        Ok(StatusCountRow {
            status,
            count: row.get(1)?,
            cost: row.get(2)?,
        })
    })?;
    rows::collect(rows)
}

pub fn spending_trend(
    conn: &Connection,
    user_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<SpendingRow>> {
    let only = scope(conn, user_id)?;
    let mut months: BTreeMap<String, SpendingRow> = BTreeMap::new();

    let mut parts = conn.prepare(
        "SELECT substr(tp.created_at, 1, 7) AS month, SUM(tp.quantity * tp.unit_cost)
         FROM ticket_parts tp
         JOIN tickets t ON t.id = tp.ticket_id
         WHERE substr(tp.created_at, 1, 10) BETWEEN ?1 AND ?2
           AND (?3 IS NULL OR t.assigned_to = ?3)
         GROUP BY month",
    )?;
    let rows = parts.query_map(params![day(from), day(to), only], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
    })?;
    for (month, cost) in rows::collect(rows)? {
        months
            .entry(month.clone())
            .or_insert_with(|| empty_month(month))
            .parts_cost += cost;
    }

    let mut tickets = conn.prepare(
        "SELECT substr(created_at, 1, 7) AS month, SUM(cost)
         FROM tickets
         WHERE substr(created_at, 1, 10) BETWEEN ?1 AND ?2
           AND (?3 IS NULL OR assigned_to = ?3)
         GROUP BY month",
    )?;
    let rows = tickets.query_map(params![day(from), day(to), only], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
    })?;
    for (month, cost) in rows::collect(rows)? {
        months
            .entry(month.clone())
            .or_insert_with(|| empty_month(month))
            .ticket_cost += cost;
    }

    Ok(months.into_values().collect())
}

fn empty_month(month: String) -> SpendingRow {
    SpendingRow {
        month,
        parts_cost: 0.0,
        ticket_cost: 0.0,
    }
}

pub fn technician_performance(
    conn: &Connection,
    user_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> AppResult<Vec<PerformanceRow>> {
    let only = scope(conn, user_id)?;

    let mut stmt = conn.prepare(
        "SELECT p.id, p.name,
                COUNT(t.id),
                COALESCE(SUM(CASE WHEN t.status = 'closed' THEN 1 ELSE 0 END), 0),
                AVG(CASE WHEN t.status = 'closed' AND t.closed_at IS NOT NULL
                         THEN (julianday(t.closed_at) - julianday(t.created_at)) * 24.0 END)
         FROM profiles p
         LEFT JOIN tickets t
                ON t.assigned_to = p.id
               AND substr(t.created_at, 1, 10) BETWEEN ?1 AND ?2
         WHERE p.role = 'technician'
           AND (?3 IS NULL OR p.id = ?3)
         GROUP BY p.id, p.name
         ORDER BY 4 DESC, p.name ASC",
    )?;

    let rows = stmt.query_map(params![day(from), day(to), only], |row| {
        Ok(PerformanceRow {
            technician_id: row.get(0)?,
            name: row.get(1)?,
            assigned: row.get(2)?,
            closed: row.get(3)?,
            avg_resolution_hours: row.get(4)?,
        })
    })?;
    rows::collect(rows)
}

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROW COUNTS
    //
    for (label, table) in [
        ("Branches", "branches"),
        ("Assets", "assets"),
        ("Technicians", "profiles"),
        ("Tickets", "tickets"),
        ("Spare parts", "spare_parts"),
        ("Audit rows", "audit_logs"),
    ] {
        let count: i64 =
            pool.conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        println!("{}• {}:{} {}{}{}", CYAN, label, RESET, GREEN, count, RESET);
    }

    //
    // 3) TICKET DATE RANGE
    //
    let first: Option<String> = pool
        .conn
        .query_row(
            "SELECT substr(created_at, 1, 10) FROM tickets ORDER BY created_at ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    let last: Option<String> = pool
        .conn
        .query_row(
            "SELECT substr(created_at, 1, 10) FROM tickets ORDER BY created_at DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let fmt = |d: Option<String>| d.unwrap_or_else(|| format!("{GREY}--{RESET}"));

    println!("{}• Tickets opened:{}", CYAN, RESET);
    println!("    from: {}", fmt(first));
    println!("    to:   {}", fmt(last));

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::queries::{assets, org, parts, profiles, tickets};
    use crate::models::profile::Role;
    use crate::models::ticket::TicketPriority;

    fn seeded() -> (DbPool, i64, i64) {
        let pool = DbPool::in_memory().unwrap();
        let c = &pool.conn;

        let admin = profiles::insert_profile(c, "Mona", Role::Admin).unwrap();
        let tech = profiles::insert_profile(c, "Karim", Role::Technician).unwrap();
        let branch = org::insert_branch(
            c,
            &org::NewBranch {
                brand_id: None,
                name: "Downtown",
                location: None,
                geofence_radius_meters: None,
            },
        )
        .unwrap();
        let asset = assets::insert_asset(
            c,
            &assets::NewAsset {
                branch_id: branch,
                area_id: None,
                name: "Chiller 1",
                category: "hvac",
                serial: None,
                specification: None,
            },
            None,
        )
        .unwrap();

        for (title, at) in [
            ("Leak", "2025-03-02T09:00:00+02:00"),
            ("Noise", "2025-03-10T09:00:00+02:00"),
            ("No cooling", "2025-04-01T09:00:00+02:00"),
        ] {
            tickets::insert_ticket(
                c,
                &tickets::NewTicket {
                    asset_id: asset,
                    title,
                    category: "hvac",
                    priority: TicketPriority::High,
                    created_by: Some(admin),
                    created_at: Some(at.to_string()),
                },
            )
            .unwrap();
        }

        // first ticket assigned to the technician and closed
        let mut t = tickets::get_ticket(c, 1).unwrap();
        t.assigned_to = Some(tech);
        t.status = TicketStatus::Closed;
        t.cost = 120.0;
        tickets::update_ticket(c, &t, Some(admin)).unwrap();

        let part = parts::insert_part(c, "Gasket", "gk-1", 10, 7.5, None).unwrap();
        let mut t2 = tickets::get_ticket(c, 2).unwrap();
        t2.assigned_to = Some(tech);
        tickets::update_ticket(c, &t2, Some(admin)).unwrap();
        tickets::add_part(c, 2, part, 2, Some(tech)).unwrap();

        (pool, admin, tech)
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn dashboard_is_scoped_by_role() {
        let (pool, admin, tech) = seeded();

        let all = dashboard_stats(&pool.conn, admin, d("2025-01-01"), d("2025-12-31")).unwrap();
        let total: i64 = all.iter().map(|r| r.count).sum();
        assert_eq!(total, 3);

        let mine = dashboard_stats(&pool.conn, tech, d("2025-01-01"), d("2025-12-31")).unwrap();
        let total: i64 = mine.iter().map(|r| r.count).sum();
        assert_eq!(total, 2);

        let march = dashboard_stats(&pool.conn, admin, d("2025-03-01"), d("2025-03-31")).unwrap();
        assert_eq!(march.iter().map(|r| r.count).sum::<i64>(), 2);
    }

    #[test]
    fn technician_performance_counts_closed_tickets() {
        let (pool, admin, tech) = seeded();

        let rows =
            technician_performance(&pool.conn, admin, d("2025-01-01"), d("2025-12-31")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].technician_id, tech);
        assert_eq!(rows[0].assigned, 2);
        assert_eq!(rows[0].closed, 1);
        assert!(rows[0].avg_resolution_hours.is_some());
    }

    #[test]
    fn spending_trend_groups_by_month() {
        let (pool, admin, _) = seeded();

        let rows = spending_trend(&pool.conn, admin, d("2025-03-01"), d("2025-04-30")).unwrap();
        let march = rows.iter().find(|r| r.month == "2025-03").unwrap();
        assert_eq!(march.ticket_cost, 120.0);
    }

    #[test]
    fn unknown_user_is_not_found() {
        let (pool, _, _) = seeded();
        let err = dashboard_stats(&pool.conn, 999, d("2025-01-01"), d("2025-12-31")).unwrap_err();
        assert!(matches!(err, crate::errors::AppError::NotFound { .. }));
    }
}
