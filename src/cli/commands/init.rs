use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log::oplog;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::warning;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file
///  - the SQLite database with every pending migration
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.as_deref(), cli.test)?;
    let db_path = cfg.database.clone();

    println!("⚙️  Initializing maintdesk…");
    if !cli.test {
        println!("📄 Config file : {}", Config::config_file().display());
    }
    println!("🗄️  Database   : {}", &db_path);

    // tabelle + migrazioni
    let pool = DbPool::open(&db_path)?;
    println!("✅ Database initialized at {}", &db_path);

    // log interno, non bloccante
    if let Err(e) = oplog(
        &pool.conn,
        "init",
        "database",
        &format!("Database initialized at {}", &db_path),
    ) {
        warning(format!("Failed to write internal log: {e}"));
    }

    println!("🎉 maintdesk initialization completed!");
    Ok(())
}
