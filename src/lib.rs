//! rcrm library root.
//! Exposes the CLI parser, the high-level run() function and the internal
//! modules (record store, blob store, business logic, report pipeline).

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod report;
pub mod storage;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Log { .. } => commands::log::handle(&cli.command, cfg),
        Commands::Login { .. } | Commands::Logout | Commands::Whoami => {
            commands::session::handle(&cli.command, cfg)
        }
        Commands::User { action } => commands::user::handle(action, cfg),
        Commands::Field { action } => commands::field::handle(action, cfg),
        Commands::Client { action } => commands::client::handle(action, cfg),
        Commands::Doc { action } => commands::doc::handle(action, cfg),
        Commands::Deletion { action } => commands::deletion::handle(action, cfg),
        Commands::Dashboard { .. } => commands::dashboard::handle(&cli.command, cfg),
        Commands::Report { action } => commands::report::handle(action, cfg),
        Commands::Template { action } => commands::template::handle(action, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // configuration is loaded once and passed down
    let mut cfg = Config::load()?;

    if let Some(custom_db) = &cli.db {
        cfg = cfg.with_database(custom_db);
    }

    dispatch(&cli, &cfg)
}
