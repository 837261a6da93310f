use crate::cli::commands::{
    describe_decision, opt, parse_priority, parse_status, print_or_empty,
};
use crate::cli::parser::{Commands, TicketAction};
use crate::config::Config;
use crate::core::tickets::TicketLogic;
use crate::db::pool::DbPool;
use crate::db::queries::tickets::{self, NewTicket, TicketFilter};
use crate::errors::AppResult;
use crate::export::parse_range;
use crate::models::coordinates::PositionSample;
use crate::models::ticket::Ticket;
use crate::ui::messages::{location, success};
use crate::utils::colors::RESET;
use crate::utils::formatting::{describe_priority, describe_status, ellipsize, money};
use crate::utils::table::Table;
use crate::utils::time::parse_instant;

pub fn handle(cmd: &Commands, cfg: &Config, by: Option<i64>) -> AppResult<()> {
    let Commands::Ticket { action } = cmd else {
        return Ok(());
    };
    let pool = DbPool::open(&cfg.database)?;

    match action {
        TicketAction::Open {
            title,
            asset,
            category,
            priority,
            created_at,
        } => {
            let ticket = TicketLogic::open(
                &pool,
                &NewTicket {
                    asset_id: *asset,
                    title,
                    category,
                    priority: parse_priority(priority)?,
                    created_by: by,
                    created_at: created_at.as_deref().map(parse_instant).transpose()?,
                },
            )?;
            success(format!(
                "Ticket #{} opened on asset #{} ({}).",
                ticket.id,
                ticket.asset_id,
                ticket.priority.to_db_str()
            ));
        }

        TicketAction::List {
            status,
            branch,
            asset,
            assigned_to,
            range,
        } => {
            let filter = TicketFilter {
                status: status.as_deref().map(parse_status).transpose()?,
                branch_id: *branch,
                asset_id: *asset,
                assigned_to: *assigned_to,
                created_between: range.as_deref().map(parse_range).transpose()?,
            };
            print_tickets(&tickets::list_tickets(&pool.conn, &filter)?);
        }

        TicketAction::Assign { id, tech } => {
            let ticket = TicketLogic::assign(&pool, *id, *tech, by)?;
            success(format!(
                "Ticket #{} assigned to #{} ({}).",
                ticket.id,
                tech,
                ticket.status.to_db_str()
            ));
        }

        TicketAction::Status {
            id,
            status,
            priority,
        } => {
            let ticket = TicketLogic::set_status(
                &pool,
                *id,
                parse_status(status)?,
                priority.as_deref().map(parse_priority).transpose()?,
                by,
            )?;
            success(format!(
                "Ticket #{} is now {} ({}).",
                ticket.id,
                ticket.status.to_db_str(),
                ticket.priority.to_db_str()
            ));
        }

        TicketAction::Close { id, lat, lng, cost } => {
            let sample = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(PositionSample::new(*lat, *lng)),
                _ => None,
            };
            let (ticket, check) = TicketLogic::close(&pool, cfg, *id, by, sample.as_ref(), *cost)?;
            location(describe_decision(&check.decision, &check.branch.name));
            success(format!(
                "Ticket #{} closed (cost {}).",
                ticket.id,
                money(ticket.cost)
            ));
        }

        TicketAction::Parts { id, part, quantity } => {
            if let Some(part_id) = part {
                TicketLogic::add_part(&pool, *id, *part_id, *quantity, by)?;
                success(format!("{quantity} × part #{part_id} used on ticket #{id}."));
            }

            let parts = tickets::parts_for_ticket(&pool.conn, *id)?;
            let mut t = Table::new(["Part", "Name", "Qty", "Unit cost", "Total"]);
            for p in &parts {
                t.add_row(vec![
                    p.part_id.to_string(),
                    p.part_name.clone(),
                    p.quantity.to_string(),
                    money(p.unit_cost),
                    money(p.total_cost()),
                ]);
            }
            print_or_empty(&t, "No parts used on this ticket.");
            if !parts.is_empty() {
                let total: f64 = parts.iter().map(|p| p.total_cost()).sum();
                println!("Parts total: {}", money(total));
            }
        }
    }
    Ok(())
}

fn print_tickets(rows: &[Ticket]) {
    let mut t = Table::new([
        "ID", "Opened", "Asset", "Title", "Category", "Priority", "Status", "Tech",
    ]);
    for tk in rows {
        let (status, s_col) = describe_status(tk.status);
        let (prio, p_col) = describe_priority(tk.priority);
        t.add_row(vec![
            tk.id.to_string(),
            tk.created_at.format("%Y-%m-%d %H:%M").to_string(),
            tk.asset_id.to_string(),
            ellipsize(&tk.title, 40),
            tk.category.clone(),
            format!("{p_col}{prio}{RESET}"),
            format!("{s_col}{status}{RESET}"),
            opt(tk.assigned_to),
        ]);
    }
    print_or_empty(&t, "No tickets found.");
}
