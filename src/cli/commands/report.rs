use crate::cli::commands::field::print_fields;
use crate::cli::parser::ReportCmd;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::core::templates::TemplateLogic;
use crate::errors::AppResult;
use crate::models::formula::ReportFormula;
use crate::models::template::ReportFormat;
use crate::report::assemble::DisplayOptions;
use crate::report::formula::parse_formula_arg;
use crate::report::logic::{ReportLogic, ReportSelection};
use crate::report::range::{DateRange, parse_range};
use crate::ui::messages::{info, success};
use crate::utils::date::today;
use crate::utils::table::Table;
use std::path::Path;

pub fn handle(cmd: &ReportCmd, cfg: &Config) -> AppResult<()> {
    let ctx = AppContext::open(cfg)?;

    match cmd {
        ReportCmd::Run {
            fields,
            formulas,
            format,
            range,
            template,
            save_as,
            out,
            force,
            preview,
        } => {
            let mut selection = ReportSelection::new(
                fields.iter().map(|f| f.trim().to_string()).collect(),
                formulas
                    .iter()
                    .map(|f| parse_formula_arg(f))
                    .collect::<AppResult<Vec<ReportFormula>>>()?,
                ReportFormat::Excel,
            );

            if let Some(id) = template {
                let t = TemplateLogic::load(&ctx, *id)?;
                selection.apply_template(&t);
                info(format!("Using template #{} '{}'", t.id, t.name));
            }
            if let Some(f) = format {
                selection.format = *f;
            }

            let range: Option<DateRange> = match range {
                None => None,
                Some(r) if r.eq_ignore_ascii_case("all") => None,
                Some(r) => Some(parse_range(r)?),
            };

            if let Some(name) = save_as {
                let id = TemplateLogic::save(&ctx, name, &selection)?;
                success(format!("Saved template #{} '{}'", id, name));
            }

            if *preview {
                return print_preview(&ctx, &selection, range.as_ref());
            }

            let path = ReportLogic::export(
                &ctx,
                &selection,
                range.as_ref(),
                today(),
                out.as_deref().map(Path::new),
                *force,
            )?;
            success(format!(
                "{} report written to {}",
                selection.format.as_str().to_uppercase(),
                path.display()
            ));
        }
        ReportCmd::Template { out, force } => {
            let path = ReportLogic::export_import_template(
                &ctx,
                today(),
                out.as_deref().map(Path::new),
                *force,
            )?;
            success(format!("Import template written to {}", path.display()));
        }
        ReportCmd::ListFields => print_fields(ctx.catalog.reportable()),
    }

    Ok(())
}

fn print_preview(
    ctx: &AppContext,
    selection: &ReportSelection,
    range: Option<&DateRange>,
) -> AppResult<()> {
    let table = ReportLogic::build(ctx, selection, range)?;
    let opts = DisplayOptions {
        currency_fields: ctx.config.currency_fields.clone(),
    };

    println!("📄 {}\n", ReportLogic::title(ctx, range));

    let mut out = Table::new(table.headers().as_slice());
    for row in table.display_rows(&opts) {
        out.add_row(row);
    }
    print!("{}", out.render());
    println!("\n{} row(s)", table.len());
    Ok(())
}
