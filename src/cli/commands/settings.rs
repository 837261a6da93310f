use crate::cli::commands::print_or_empty;
use crate::cli::parser::{Commands, SettingsAction};
use crate::config::Config;
use crate::db::log::oplog_quiet;
use crate::db::pool::DbPool;
use crate::db::settings::{SettingsSource, list_settings, set_setting};
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Settings { action } = cmd else {
        return Ok(());
    };
    let pool = DbPool::open(&cfg.database)?;

    match action {
        SettingsAction::Get { key } => match pool.get_setting(key)? {
            Some(v) => println!("{v}"),
            None => info(format!("'{key}' is not set, the default applies.")),
        },
        SettingsAction::Set { key, value } => {
            set_setting(&pool.conn, key, value)?;
            oplog_quiet(&pool.conn, "settings", key, value.trim());
            success(format!("{key} = {}", value.trim()));
        }
        SettingsAction::List => {
            let mut t = Table::new(["Key", "Value"]);
            for (k, v) in list_settings(&pool.conn)? {
                t.add_row(vec![k, v]);
            }
            print_or_empty(&t, "No settings stored, defaults apply.");
        }
    }
    Ok(())
}
