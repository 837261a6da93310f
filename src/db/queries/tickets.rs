use super::{atomic, found};
use crate::db::{audit, rows};
use crate::errors::{AppError, AppResult};
use crate::models::audit::AuditAction;
use crate::models::spare_part::TicketPart;
use crate::models::ticket::{Ticket, TicketPriority, TicketStatus};
use crate::utils::time::now_iso;
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params};

const TABLE: &str = "tickets";

pub struct NewTicket<'a> {
    pub asset_id: i64,
    pub title: &'a str,
    pub category: &'a str,
    pub priority: TicketPriority,
    pub created_by: Option<i64>,
    /// Backdated creation time (RFC 3339); `None` means now.
    pub created_at: Option<String>,
}

pub fn map_row(row: &Row) -> rusqlite::Result<Ticket> {
    let status_str: String = row.get("status")?;
    let status = TicketStatus::from_db_str(&status_str)
        .ok_or_else(|| rows::invalid(TABLE, "status", &status_str))?;

    let priority_str: String = row.get("priority")?;
    let priority = TicketPriority::from_db_str(&priority_str)
        .ok_or_else(|| rows::invalid(TABLE, "priority", &priority_str))?;

    let created_raw: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    rows::timestamp(TABLE, "updated_at", &updated_at)?;

    Ok(Ticket {
        id: row.get("id")?,
        asset_id: row.get("asset_id")?,
        branch_id: row.get("branch_id")?,
        title: row.get("title")?,
        category: row.get("category")?,
        priority,
        status,
        assigned_to: row.get("assigned_to")?,
        created_by: row.get("created_by")?,
        created_at: rows::timestamp(TABLE, "created_at", &created_raw)?,
        updated_at,
        closed_at: rows::opt_timestamp(TABLE, "closed_at", row.get("closed_at")?)?,
        cost: row.get("cost")?,
    })
}

fn snapshot(t: &Ticket) -> AppResult<serde_json::Value> {
    Ok(serde_json::to_value(t)?)
}

/// Open a ticket for an asset. The branch is taken from the asset.
pub fn insert_ticket(conn: &Connection, t: &NewTicket) -> AppResult<i64> {
    atomic(conn, |tx| {
        let branch_id: i64 = found(
            tx.query_row(
                "SELECT branch_id FROM assets WHERE id = ?1",
                [t.asset_id],
                |r| r.get(0),
            ),
            "Asset",
            t.asset_id,
        )?;

        let created_at = t.created_at.clone().unwrap_or_else(now_iso);

        tx.execute(
            "INSERT INTO tickets (asset_id, branch_id, title, category, priority, status, created_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 'open', ?6, ?7, ?7)",
            params![
                t.asset_id,
                branch_id,
                t.title.trim(),
                t.category.trim().to_lowercase(),
                t.priority.to_db_str(),
                t.created_by,
                created_at,
            ],
        )?;
        let id = tx.last_insert_rowid();

        let created = get_ticket(tx, id)?;
        audit::record(
            tx,
            TABLE,
            id,
            AuditAction::Insert,
            None,
            Some(&snapshot(&created)?),
            t.created_by,
        )?;

        Ok(id)
    })
}

pub fn get_ticket(conn: &Connection, id: i64) -> AppResult<Ticket> {
    found(
        conn.query_row("SELECT * FROM tickets WHERE id = ?1", [id], map_row),
        "Ticket",
        id,
    )
}

#[derive(Debug, Default, Clone)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
    pub branch_id: Option<i64>,
    pub asset_id: Option<i64>,
    pub assigned_to: Option<i64>,
    /// Inclusive creation-date bounds.
    pub created_between: Option<(NaiveDate, NaiveDate)>,
}

pub fn list_tickets(conn: &Connection, f: &TicketFilter) -> AppResult<Vec<Ticket>> {
    let (from, to) = match f.created_between {
        Some((a, b)) => (
            Some(a.format("%Y-%m-%d").to_string()),
            Some(b.format("%Y-%m-%d").to_string()),
        ),
        None => (None, None),
    };

    let mut stmt = conn.prepare(
        "SELECT * FROM tickets
         WHERE (?1 IS NULL OR status = ?1)
           AND (?2 IS NULL OR branch_id = ?2)
           AND (?3 IS NULL OR asset_id = ?3)
           AND (?4 IS NULL OR assigned_to = ?4)
           AND (?5 IS NULL OR substr(created_at, 1, 10) >= ?5)
           AND (?6 IS NULL OR substr(created_at, 1, 10) <= ?6)
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows = stmt.query_map(
        params![
            f.status.map(|s| s.to_db_str()),
            f.branch_id,
            f.asset_id,
            f.assigned_to,
            from,
            to
        ],
        map_row,
    )?;
    let mut tickets = rows::collect(rows)?;

    // stored offsets vary (backdated input, DST): order by instant, not text
    tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(tickets)
}

/// Maintenance history of one asset, newest first.
pub fn history_for_asset(conn: &Connection, asset_id: i64) -> AppResult<Vec<Ticket>> {
    list_tickets(
        conn,
        &TicketFilter {
            asset_id: Some(asset_id),
            ..Default::default()
        },
    )
}

/// Persist status/assignment/cost changes, auditing the before/after images.
/// `updated_at` is refreshed; `closed_at` follows the status.
pub fn update_ticket(conn: &Connection, updated: &Ticket, changed_by: Option<i64>) -> AppResult<()> {
    atomic(conn, |tx| {
        let before = get_ticket(tx, updated.id)?;
        let now = now_iso();

        let closed_at = if updated.status == TicketStatus::Closed {
            Some(
                before
                    .closed_at
                    .map(|c| c.to_rfc3339())
                    .unwrap_or_else(|| now.clone()),
            )
        } else {
            None
        };

        tx.execute(
            "UPDATE tickets
             SET status = ?1, priority = ?2, assigned_to = ?3, cost = ?4,
                 updated_at = ?5, closed_at = ?6
             WHERE id = ?7",
            params![
                updated.status.to_db_str(),
                updated.priority.to_db_str(),
                updated.assigned_to,
                updated.cost,
                now,
                closed_at,
                updated.id
            ],
        )?;

        let after = get_ticket(tx, updated.id)?;
        audit::record(
            tx,
            TABLE,
            updated.id,
            AuditAction::Update,
            Some(&snapshot(&before)?),
            Some(&snapshot(&after)?),
            changed_by,
        )?;
        Ok(())
    })
}

/// Consume spare parts on a ticket: stock is decremented and the part cost
/// recorded at its current unit price, all in one transaction.
pub fn add_part(
    conn: &Connection,
    ticket_id: i64,
    part_id: i64,
    quantity: i64,
    changed_by: Option<i64>,
) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::InvalidInput("quantity must be positive".into()));
    }

    let ticket = get_ticket(conn, ticket_id)?;
    if ticket.status.is_terminal() {
        return Err(AppError::InvalidInput(format!(
            "ticket #{ticket_id} is {}",
            ticket.status.to_db_str()
        )));
    }

    let tx = conn.unchecked_transaction()?;

    let part = super::parts::get_part(&tx, part_id)?;
    if part.stock < quantity {
        return Err(AppError::InvalidInput(format!(
            "not enough '{}' in stock ({} left, {} requested)",
            part.name, part.stock, quantity
        )));
    }

    tx.execute(
        "INSERT INTO ticket_parts (ticket_id, part_id, quantity, unit_cost, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![ticket_id, part_id, quantity, part.unit_cost, now_iso()],
    )?;

    super::parts::adjust_stock(&tx, part_id, -quantity, changed_by)?;

    tx.commit()?;
    Ok(())
}

pub fn parts_for_ticket(conn: &Connection, ticket_id: i64) -> AppResult<Vec<TicketPart>> {
    let mut stmt = conn.prepare(
        "SELECT tp.ticket_id, tp.part_id, sp.name, tp.quantity, tp.unit_cost
         FROM ticket_parts tp
         JOIN spare_parts sp ON sp.id = tp.part_id
         WHERE tp.ticket_id = ?1
         ORDER BY tp.id ASC",
    )?;
    let rows = stmt.query_map([ticket_id], |row| {
        Ok(TicketPart {
            ticket_id: row.get(0)?,
            part_id: row.get(1)?,
            part_name: row.get(2)?,
            quantity: row.get(3)?,
            unit_cost: row.get(4)?,
        })
    })?;
    rows::collect(rows)
}
