use crate::cli::commands::print_or_empty;
use crate::cli::parser::{Commands, PartAction};
use crate::config::Config;
use crate::db::log::oplog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries::parts::{adjust_stock, insert_part, list_parts};
use crate::db::settings::low_stock_threshold;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use crate::utils::colors::{RED, RESET};
use crate::utils::formatting::money;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config, by: Option<i64>) -> AppResult<()> {
    let Commands::Part { action } = cmd else {
        return Ok(());
    };
    let pool = DbPool::open(&cfg.database)?;

    match action {
        PartAction::Add {
            name,
            sku,
            stock,
            unit_cost,
        } => {
            if name.trim().is_empty() || sku.trim().is_empty() {
                return Err(AppError::InvalidInput("name and SKU are required".into()));
            }
            let id = insert_part(&pool.conn, name, sku, *stock, *unit_cost, by)?;
            oplog_quiet(&pool.conn, "part_add", &format!("#{id}"), name);
            success(format!("Part #{id} '{}' added ({stock} in stock).", name.trim()));
        }

        PartAction::List { low_only } => {
            let threshold = low_stock_threshold(&pool)?;
            let mut t = Table::new(["ID", "SKU", "Name", "Stock", "Unit cost"]);
            for p in list_parts(&pool.conn)? {
                let low = p.is_low_stock(threshold);
                if *low_only && !low {
                    continue;
                }
                let stock = if low {
                    format!("{RED}{}{RESET}", p.stock)
                } else {
                    p.stock.to_string()
                };
                t.add_row(vec![p.id.to_string(), p.sku, p.name, stock, money(p.unit_cost)]);
            }
            print_or_empty(&t, "No spare parts found.");
        }

        PartAction::Restock { id, quantity } => {
            if *quantity <= 0 {
                return Err(AppError::InvalidInput("restock quantity must be positive".into()));
            }
            let part = adjust_stock(&pool.conn, *id, *quantity, by)?;
            oplog_quiet(
                &pool.conn,
                "part_restock",
                &format!("#{id}"),
                &format!("+{quantity} → {}", part.stock),
            );
            success(format!("'{}' restocked: {} in stock.", part.name, part.stock));
            if part.is_low_stock(low_stock_threshold(&pool)?) {
                warning("Still at or below the low-stock threshold.");
            }
        }
    }
    Ok(())
}
