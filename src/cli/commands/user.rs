use crate::cli::parser::UserCmd;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::core::users::UserLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;

pub fn handle(cmd: &UserCmd, cfg: &Config) -> AppResult<()> {
    let ctx = AppContext::open(cfg)?;

    match cmd {
        UserCmd::Add { email, name, role } => {
            let user = UserLogic::create(&ctx, email, name, *role)?;
            success(format!(
                "Created user #{} {} <{}> ({})",
                user.id,
                user.name,
                user.email,
                user.role.to_db_str()
            ));
        }
        UserCmd::List => {
            let users = UserLogic::list(&ctx)?;
            if users.is_empty() {
                info("No users.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "Email", "Name", "Role", "Created"]);
            for u in users {
                table.add_row(vec![
                    u.id.to_string(),
                    u.email,
                    u.name,
                    u.role.to_db_str().to_string(),
                    u.created_at.chars().take(10).collect(),
                ]);
            }
            print!("{}", table.render());
        }
        UserCmd::Del { id } => {
            let user = UserLogic::delete(&ctx, *id)?;
            success(format!("Deleted user #{} <{}>", user.id, user.email));
        }
    }

    Ok(())
}
