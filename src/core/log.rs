use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use ansi_term::Colour;
use regex::Regex;

const MAX_OP_WIDTH: usize = 60;

/// Restituisce il colore ANSI in base all'operazione
fn color_for_operation(op: &str) -> Colour {
    match op {
        "init" => Colour::RGB(255, 153, 51), // arancione
        "migration_applied" => Colour::Purple,
        "check_in" | "ticket_open" | "asset_add" | "part_add" => Colour::Green,
        "check_out" | "ticket_close" => Colour::Cyan,
        "ticket_assign" | "ticket_status" | "asset_update" | "settings" => Colour::Yellow,
        "part_restock" | "ticket_part" | "schedule_run" => Colour::Blue,
        "track" | "ping" => Colour::RGB(120, 120, 120),
        _ => Colour::White,
    }
}

pub struct LogRow {
    pub id: i64,
    pub date: String,
    pub operation: String,
    pub target: String,
    pub message: String,
}

pub struct LogLogic;

impl LogLogic {
    /// Rows of the internal log, oldest first. `operation` filters by
    /// exact operation name.
    pub fn load(pool: &DbPool, operation: Option<&str>) -> AppResult<Vec<LogRow>> {
        let mut stmt = pool.conn.prepare_cached(
            "SELECT id, date, operation, target, message FROM log
             WHERE (?1 IS NULL OR operation = ?1)
             ORDER BY id ASC",
        )?;

        let rows = stmt.query_map([operation], |row| {
            let raw_date: String = row.get(1)?;
            let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or(raw_date);

            Ok(LogRow {
                id: row.get(0)?,
                date,
                operation: row.get(2)?,
                target: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                message: row.get(4)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn print_log(pool: &DbPool, operation: Option<&str>) -> AppResult<()> {
        let entries = Self::load(pool, operation)?;
        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let ansi = Regex::new(r"\x1B\[[0-9;]*[mK]").map_err(|e| AppError::Other(e.to_string()))?;
        let visible_len = |s: &str| ansi.replace_all(s, "").chars().count();

        let id_w = entries
            .iter()
            .map(|e| e.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries.iter().map(|e| e.date.len()).max().unwrap_or(10);

        let cells: Vec<String> = entries
            .iter()
            .map(|e| {
                let color = color_for_operation(&e.operation);
                let rest = if e.target.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", e.target)
                };

                // --- TRUNCATE a 60 caratteri visibili, solo l'op resta colorata ---
                let room = MAX_OP_WIDTH.saturating_sub(e.operation.chars().count());
                let rest = if rest.chars().count() > room {
                    let mut s: String = rest.chars().take(room.saturating_sub(3)).collect();
                    s.push_str("...");
                    s
                } else {
                    rest
                };
                format!("{}{}", color.paint(e.operation.as_str()), rest)
            })
            .collect();

        let op_w = cells
            .iter()
            .map(|c| visible_len(c))
            .max()
            .unwrap_or(10)
            .min(MAX_OP_WIDTH);

        println!("📜 Internal log:\n");

        for (e, cell) in entries.iter().zip(&cells) {
            let padding = " ".repeat(op_w.saturating_sub(visible_len(cell)));
            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                e.id,
                e.date,
                cell,
                padding,
                e.message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::log::oplog;

    #[test]
    fn load_filters_by_operation() {
        let pool = DbPool::in_memory().unwrap();
        oplog(&pool.conn, "ticket_open", "#1", "Leak").unwrap();
        oplog(&pool.conn, "check_in", "Karim", "in at Downtown").unwrap();

        let opened = LogLogic::load(&pool, Some("ticket_open")).unwrap();
        assert_eq!(opened.len(), 1);
        assert_eq!(opened[0].target, "#1");

        // migrations are journaled too
        let all = LogLogic::load(&pool, None).unwrap();
        assert!(all.iter().any(|r| r.operation == "migration_applied"));
        assert!(all.len() >= 3);
    }
}
