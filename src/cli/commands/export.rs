use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::ExportLogic;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        what,
        format,
        file,
        range,
        force,
    } = cmd
    {
        let pool = DbPool::open(&cfg.database)?;
        let written = ExportLogic::export(&pool, *what, *format, file, range.as_deref(), *force)?;
        if written > 0 {
            info(format!("{written} {} row(s) written.", what.as_str()));
        }
    }
    Ok(())
}
