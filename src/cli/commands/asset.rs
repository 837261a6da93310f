use crate::cli::commands::{opt, print_or_empty};
use crate::cli::parser::{AssetAction, Commands};
use crate::config::Config;
use crate::core::assets::{AssetDetail, AssetLogic};
use crate::db::pool::DbPool;
use crate::db::queries::assets::NewAsset;
use crate::errors::AppResult;
use crate::ui::messages::{header, success, warning};
use crate::utils::colors::{RESET, color_for_health};
use crate::utils::formatting::{describe_priority, describe_status, ellipsize, money};
use crate::utils::table::Table;
use chrono::Local;

pub fn handle(cmd: &Commands, cfg: &Config, by: Option<i64>) -> AppResult<()> {
    let Commands::Asset { action } = cmd else {
        return Ok(());
    };
    let pool = DbPool::open(&cfg.database)?;

    match action {
        AssetAction::Add {
            name,
            branch,
            area,
            category,
            serial,
            specification,
        } => {
            let asset = AssetLogic::create(
                &pool,
                NewAsset {
                    branch_id: *branch,
                    area_id: *area,
                    name,
                    category,
                    serial: serial.as_deref(),
                    specification: None,
                },
                specification.as_deref(),
                by,
            )?;
            success(format!("Asset #{} '{}' added.", asset.id, asset.name));
        }

        AssetAction::Update {
            id,
            status,
            specification,
        } => {
            let asset =
                AssetLogic::update(&pool, *id, status.as_deref(), specification.as_deref(), by)?;
            success(format!("Asset #{} '{}' updated ({}).", asset.id, asset.name, asset.status));
        }

        AssetAction::List { branch } | AssetAction::Health { branch } => {
            let mut entries = AssetLogic::list(&pool, *branch)?;
            if matches!(action, AssetAction::Health { .. }) {
                // peggiori in cima
                entries.sort_by_key(|e| e.health);
            }

            let mut t = Table::new(["ID", "Asset", "Category", "Branch", "Status", "Tickets", "Health"]);
            for e in entries {
                t.add_row(vec![
                    e.asset.id.to_string(),
                    ellipsize(&e.asset.name, 32),
                    e.asset.category,
                    e.asset.branch_id.to_string(),
                    e.asset.status,
                    e.tickets.to_string(),
                    format!("{}{}{}", color_for_health(e.health), e.health, RESET),
                ]);
            }
            print_or_empty(&t, "No assets found.");
        }

        AssetAction::Show { id } => {
            let detail = AssetLogic::detail(&pool, *id, Local::now().fixed_offset())?;
            print_detail(&detail);
        }
    }
    Ok(())
}

fn print_detail(d: &AssetDetail) {
    header(format!("Asset #{} {}", d.asset.id, d.asset.name));

    println!("Branch      : {} (#{})", d.branch.name, d.branch.id);
    println!("Category    : {}", d.asset.category);
    println!("Serial      : {}", opt(d.asset.serial.as_ref()));
    println!("Status      : {}", d.asset.status);
    println!("Installed   : {}", d.asset.created_at);
    println!(
        "Health      : {}{}{}",
        color_for_health(d.health),
        d.health,
        RESET
    );
    println!("MTBF        : {:.1} days", d.mtbf_days);

    if let Some(spec) = &d.asset.specification {
        println!("Spec        :");
        for (k, v) in spec.as_object().into_iter().flatten() {
            println!("  {k}: {v}");
        }
    }
    println!();

    if d.recurring_fault {
        warning("Recurring fault: 3 or more tickets in the last 30 days.");
    }
    if d.history_recurring_fault {
        warning("Recurring fault: more than 3 tickets in the last 60 days.");
    }

    let mut t = Table::new(["ID", "Opened", "Title", "Priority", "Status", "Cost"]);
    for tk in &d.history {
        let (status, s_col) = describe_status(tk.status);
        let (prio, p_col) = describe_priority(tk.priority);
        t.add_row(vec![
            tk.id.to_string(),
            tk.created_at.format("%Y-%m-%d").to_string(),
            ellipsize(&tk.title, 40),
            format!("{p_col}{prio}{RESET}"),
            format!("{s_col}{status}{RESET}"),
            money(tk.cost),
        ]);
    }
    print_or_empty(&t, "No maintenance history.");
}
