use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::db::log;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped in test mode)
///  - the SQLite database with all pending migrations
///  - the default field catalog
///  - the blob storage directory
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;

    println!("⚙️  Initializing rcrm…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", &cfg.database);
    println!("📦 Storage    : {}", cfg.storage_root().display());

    let ctx = AppContext::open(&cfg)?;
    std::fs::create_dir_all(cfg.storage_root())?;

    success(format!("Database initialized at {}", &cfg.database));

    if let Err(e) = log::ttlog(
        ctx.conn(),
        "init",
        "Database initialized",
        &format!("Database initialized at {}", &cfg.database),
    ) {
        warning(format!("Failed to write internal log: {}", e));
    }

    println!(
        "🎉 rcrm initialization completed! {} fields in the catalog.",
        ctx.catalog.len()
    );
    Ok(())
}
