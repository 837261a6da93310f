use crate::cli::commands::{opt, print_or_empty};
use crate::cli::parser::{Commands, ScheduleAction};
use crate::config::Config;
use crate::core::schedules::ScheduleLogic;
use crate::db::log::oplog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries::assets::get_asset;
use crate::db::queries::schedules::{insert_schedule, list_schedules, set_active};
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::date::{require_date, today};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config, by: Option<i64>) -> AppResult<()> {
    let Commands::Schedule { action } = cmd else {
        return Ok(());
    };
    let pool = DbPool::open(&cfg.database)?;

    match action {
        ScheduleAction::Add {
            title,
            asset,
            frequency_days,
            first_due,
        } => {
            get_asset(&pool.conn, *asset)?;
            let first = match first_due {
                Some(d) => require_date(d)?,
                None => today(),
            };
            let id = insert_schedule(&pool.conn, *asset, title, *frequency_days, first)?;
            oplog_quiet(
                &pool.conn,
                "schedule_add",
                &format!("#{id}"),
                &format!("'{title}' every {frequency_days} day(s) on asset #{asset}"),
            );
            success(format!(
                "Schedule #{id} added, first due {}.",
                first.format(&cfg.date_format)
            ));
        }

        ScheduleAction::List { asset } => {
            let mut t = Table::new(["ID", "Asset", "Title", "Every", "Next due", "Last done", "Active"]);
            for s in list_schedules(&pool.conn, *asset)? {
                t.add_row(vec![
                    s.id.to_string(),
                    s.asset_id.to_string(),
                    s.title,
                    format!("{}d", s.frequency_days),
                    s.next_due.format(&cfg.date_format).to_string(),
                    opt(s.last_done.map(|d| d.format(&cfg.date_format))),
                    if s.active { "yes" } else { "no" }.to_string(),
                ]);
            }
            print_or_empty(&t, "No schedules found.");
        }

        ScheduleAction::Run { date } => {
            let day = match date {
                Some(d) => require_date(d)?,
                None => today(),
            };
            let runs = ScheduleLogic::run_due(&pool, day, by)?;
            if runs.is_empty() {
                info("Nothing due.");
            }
            for r in &runs {
                success(format!(
                    "Schedule #{} → ticket #{} (next due {}).",
                    r.schedule_id,
                    r.ticket_id,
                    r.next_due.format(&cfg.date_format)
                ));
            }
        }

        ScheduleAction::Pause { id } | ScheduleAction::Resume { id } => {
            let active = matches!(action, ScheduleAction::Resume { .. });
            set_active(&pool.conn, *id, active)?;
            success(format!(
                "Schedule #{id} {}.",
                if active { "resumed" } else { "paused" }
            ));
        }
    }
    Ok(())
}
