use crate::cli::commands::{print_or_empty, range_or_current_month, require_user};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::dashboard::{Dashboard, DashboardLogic, DashboardRequest};
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::reports::DistributionEntry;
use crate::ui::messages::{header, info, warning};
use crate::utils::colors::{CYAN, RED, RESET, YELLOW};
use crate::utils::formatting::money;
use crate::utils::table::Table;
use chrono::Local;
use tokio_util::sync::CancellationToken;

pub fn handle(cmd: &Commands, cfg: &Config, acting_as: Option<i64>) -> AppResult<()> {
    let Commands::Stats { range } = cmd else {
        return Ok(());
    };
    let user_id = require_user(acting_as)?;
    let (from, to) = range_or_current_month(range.as_deref())?;
    let pool = DbPool::open(&cfg.database)?;

    let req = DashboardRequest {
        user_id,
        from,
        to,
        now: Local::now().fixed_offset(),
    };

    // il comando termina prima di qualunque cancellazione
    let Some(dashboard) = DashboardLogic::load_or_empty(&pool, &req, &CancellationToken::new())?
    else {
        return Ok(());
    };

    header(format!(
        "Dashboard {} → {}",
        from.format(&cfg.date_format),
        to.format(&cfg.date_format)
    ));
    print_dashboard(&dashboard);
    Ok(())
}

fn print_dashboard(d: &Dashboard) {
    if d.is_empty() {
        info("No tickets in this period.");
        return;
    }

    let s = &d.summary;
    println!("{CYAN}•{RESET} Tickets:      {}", s.total);
    println!("{CYAN}•{RESET} Open:         {}", s.open);
    println!("{CYAN}•{RESET} Emergencies:  {RED}{}{RESET}", s.emergency);
    println!("{CYAN}•{RESET} Closed today: {}", s.closed_today);
    println!();

    print_distribution("Status", &s.by_status);
    print_distribution("Category", &s.by_category);

    if !d.by_status.is_empty() {
        let mut t = Table::new(["Status", "Tickets", "Cost"]);
        for row in &d.by_status {
            t.add_row(vec![
                row.status.to_db_str().to_string(),
                row.count.to_string(),
                money(row.cost),
            ]);
        }
        print_or_empty(&t, "");
        println!();
    }

    if !d.sla_breaches.is_empty() {
        warning(format!(
            "{} ticket(s) open for more than {} hours:",
            d.sla_breaches.len(),
            d.sla_threshold_hours
        ));
        for b in &d.sla_breaches {
            println!("  {YELLOW}#{}{RESET} {} ({}h)", b.ticket_id, b.title, b.age_hours);
        }
    }

    if !d.low_stock.is_empty() {
        warning(format!(
            "{} part(s) at or below {} in stock:",
            d.low_stock.len(),
            d.low_stock_threshold
        ));
        for p in &d.low_stock {
            println!("  {YELLOW}{}{RESET} {} ({} left)", p.sku, p.name, p.stock);
        }
    }
}

fn print_distribution(label: &str, entries: &[DistributionEntry]) {
    let mut t = Table::new([label, "Count"]);
    for e in entries {
        t.add_row(vec![e.name.clone(), e.count.to_string()]);
    }
    print_or_empty(&t, "");
    println!();
}
