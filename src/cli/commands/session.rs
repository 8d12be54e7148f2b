use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::auth::AuthLogic;
use crate::core::context::AppContext;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

/// `login`, `logout` and `whoami`.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let ctx = AppContext::open(cfg)?;

    match cmd {
        Commands::Login { email } => {
            let user = AuthLogic::sign_in(&ctx, email)?;
            success(format!(
                "Signed in as {} <{}> ({})",
                user.name,
                user.email,
                user.role.to_db_str()
            ));
        }
        Commands::Logout => {
            if AuthLogic::sign_out(&ctx)? {
                success("Signed out.");
            } else {
                info("Nobody is signed in.");
            }
        }
        Commands::Whoami => match AuthLogic::current_user(&ctx)? {
            Some(user) => println!(
                "{} <{}> ({}, id {})",
                user.name,
                user.email,
                user.role.to_db_str(),
                user.id
            ),
            None => info("Nobody is signed in."),
        },
        _ => {}
    }

    Ok(())
}
