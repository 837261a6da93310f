use crate::cli::commands::{opt, print_or_empty};
use crate::cli::parser::{Commands, TechAction};
use crate::config::Config;
use crate::db::log::oplog_quiet;
use crate::db::pool::DbPool;
use crate::db::queries::profiles::{insert_profile, list_profiles};
use crate::errors::{AppError, AppResult};
use crate::models::profile::Role;
use crate::ui::messages::success;
use crate::utils::table::Table;

fn parse_role(s: &str) -> AppResult<Role> {
    Role::from_input(s).ok_or_else(|| AppError::InvalidRole(s.to_string()))
}

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Tech { action } = cmd else {
        return Ok(());
    };
    let pool = DbPool::open(&cfg.database)?;

    match action {
        TechAction::Add { name, role } => {
            let role = parse_role(role)?;
            if name.trim().is_empty() {
                return Err(AppError::InvalidInput("name cannot be empty".into()));
            }
            let id = insert_profile(&pool.conn, name, role)?;
            oplog_quiet(
                &pool.conn,
                "profile_add",
                &format!("#{id}"),
                &format!("{name} ({})", role.to_db_str()),
            );
            success(format!("Profile #{id} '{}' added as {}.", name.trim(), role.to_db_str()));
        }
        TechAction::List { role } => {
            let role = role.as_deref().map(parse_role).transpose()?;
            let mut t = Table::new(["ID", "Name", "Role", "Last position", "Last seen"]);
            for p in list_profiles(&pool.conn, role)? {
                t.add_row(vec![
                    p.id.to_string(),
                    p.name,
                    p.role.to_db_str().to_string(),
                    p.last_location
                        .map(|c| format!("{:.5}, {:.5}", c.lat, c.lng))
                        .unwrap_or_else(|| "--".into()),
                    opt(p.last_seen),
                ]);
            }
            print_or_empty(&t, "No profiles found.");
        }
    }
    Ok(())
}
