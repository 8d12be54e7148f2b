use crate::cli::parser::FieldCmd;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::core::fields::FieldLogic;
use crate::errors::AppResult;
use crate::models::field::Field;
use crate::ui::messages::success;
use crate::utils::table::Table;

pub fn handle(cmd: &FieldCmd, cfg: &Config) -> AppResult<()> {
    let mut ctx = AppContext::open(cfg)?;

    match cmd {
        FieldCmd::List => print_fields(FieldLogic::list(&ctx)),
        FieldCmd::Add {
            id,
            label,
            kind,
            required,
            options,
        } => {
            let mut field = Field::new(id, label, *kind);
            field.required = *required;
            if !options.is_empty() {
                field.options = Some(options.iter().map(|o| o.trim().to_string()).collect());
            }

            FieldLogic::add(&mut ctx, field)?;
            success(format!("Added field '{}'", id));
        }
        FieldCmd::Remove { id } => {
            FieldLogic::remove(&mut ctx, id)?;
            success(format!("Removed field '{}'", id));
        }
    }

    Ok(())
}

pub(crate) fn print_fields<'a>(fields: impl IntoIterator<Item = &'a Field>) {
    let mut table = Table::new(&["ID", "Label", "Type", "Required", "Options"]);
    for f in fields {
        table.add_row(vec![
            f.id.clone(),
            f.label.clone(),
            f.kind.as_str().to_string(),
            if f.required { "yes".into() } else { String::new() },
            f.options.as_ref().map(|o| o.join(", ")).unwrap_or_default(),
        ]);
    }
    print!("{}", table.render());
}
