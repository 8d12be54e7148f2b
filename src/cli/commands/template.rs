use crate::cli::parser::TemplateCmd;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::core::templates::TemplateLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;

pub fn handle(cmd: &TemplateCmd, cfg: &Config) -> AppResult<()> {
    let ctx = AppContext::open(cfg)?;

    match cmd {
        TemplateCmd::List => {
            let templates = TemplateLogic::list(&ctx)?;
            if templates.is_empty() {
                info("No saved templates.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "Name", "Format", "Fields", "Formulas", "Owner"]);
            for t in templates {
                table.add_row(vec![
                    t.id.to_string(),
                    t.name,
                    t.format.as_str().to_string(),
                    t.fields.join(", "),
                    t.formulas
                        .iter()
                        .map(|f| f.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    format!("#{}", t.owner),
                ]);
            }
            print!("{}", table.render());
        }
        TemplateCmd::Show { id } => {
            let t = TemplateLogic::load(&ctx, *id)?;
            println!("🧩 Template #{} '{}'", t.id, t.name);
            println!("Format  : {}", t.format.as_str());
            println!("Owner   : #{}", t.owner);
            println!("Created : {}", t.created_at);
            println!("Fields  :");
            for f in &t.fields {
                println!("  - {} ({})", f, ctx.catalog.label(f));
            }
            if !t.formulas.is_empty() {
                println!("Formulas:");
                for f in &t.formulas {
                    println!("  - {} = {}", f.name, f.expression);
                }
            }
        }
        TemplateCmd::Del { id } => {
            let t = TemplateLogic::delete(&ctx, *id)?;
            success(format!("Deleted template #{} '{}'", t.id, t.name));
        }
    }

    Ok(())
}
