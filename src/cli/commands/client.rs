use crate::cli::parser::ClientCmd;
use crate::config::Config;
use crate::core::clients::{ClientLogic, parse_assignment};
use crate::core::context::AppContext;
use crate::core::documents::DocumentLogic;
use crate::errors::AppResult;
use crate::models::field::FieldType;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;
use std::path::Path;

const WRAP_AT: usize = 40;

pub fn handle(cmd: &ClientCmd, cfg: &Config) -> AppResult<()> {
    let ctx = AppContext::open(cfg)?;

    match cmd {
        ClientCmd::Add { values } => {
            let values = parse_values(values)?;
            let client = ClientLogic::create(&ctx, &values)?;
            success(format!("Created client #{} {}", client.id, client.display_name()));
        }
        ClientCmd::Edit { id, values } => {
            let values = parse_values(values)?;
            let client = ClientLogic::update(&ctx, *id, &values)?;
            success(format!("Updated client #{} {}", client.id, client.display_name()));
        }
        ClientCmd::Show { id } => show(&ctx, *id)?,
        ClientCmd::List { newest } => list(&ctx, *newest)?,
        ClientCmd::Del { id } => {
            let client = ClientLogic::delete(&ctx, *id)?;
            success(format!("Deleted client #{} {}", client.id, client.display_name()));
        }
        ClientCmd::Import { file } => {
            let ids = ClientLogic::import_csv(&ctx, Path::new(file))?;
            success(format!("Imported {} client(s) from {}", ids.len(), file));
        }
    }

    Ok(())
}

fn parse_values(raw: &[String]) -> AppResult<Vec<(String, String)>> {
    raw.iter().map(|s| parse_assignment(s)).collect()
}

fn show(ctx: &AppContext, id: i64) -> AppResult<()> {
    let client = ClientLogic::get(ctx, id)?;

    println!("👤 Client #{} {}\n", client.id, client.display_name());

    let mut table = Table::new(&["Field", "Value"]);
    for f in ctx.catalog.fields() {
        let value = client
            .data
            .get(&f.id)
            .map(|v| f.format_value(v))
            .unwrap_or_default();
        table.add_row(vec![f.label.clone(), value]);
    }
    // values for fields no longer in the catalog
    for (k, v) in client.data.iter().filter(|(k, _)| !ctx.catalog.contains(k)) {
        table.add_row(vec![k.clone(), v.to_string()]);
    }
    table.add_row(vec!["Created at".into(), client.created_at.clone()]);
    table.add_row(vec!["Updated at".into(), client.updated_at.clone()]);
    print!("{}", table.render());

    // long free text does not fit a table cell
    for f in ctx.catalog.fields().iter().filter(|f| f.kind == FieldType::Textarea) {
        if let Some(text) = client.data.get(&f.id).and_then(|v| v.as_str())
            && text.chars().count() > WRAP_AT
        {
            println!("\n📝 {}:", f.label);
            println!("{}", textwrap::indent(&textwrap::fill(text, 72), "  "));
        }
    }

    let docs = DocumentLogic::list(ctx, id)?;
    if !docs.is_empty() {
        println!("\n📎 Documents:");
        for d in docs {
            println!("  #{:<4} {} ({})", d.id, d.file_name, d.human_size());
        }
    }

    Ok(())
}

fn list(ctx: &AppContext, newest: bool) -> AppResult<()> {
    let clients = ClientLogic::list(ctx, newest)?;
    if clients.is_empty() {
        info("No clients yet.");
        return Ok(());
    }

    let summary: Vec<_> = ctx
        .catalog
        .fields()
        .iter()
        .filter(|f| ["email", "company", "status"].contains(&f.id.as_str()))
        .collect();

    let mut headers = vec!["ID".to_string(), "Name".to_string()];
    headers.extend(summary.iter().map(|f| f.label.clone()));
    headers.push("Created".to_string());

    let mut table = Table::new(headers.as_slice());
    for c in &clients {
        let mut row = vec![c.id.to_string(), c.display_name()];
        row.extend(summary.iter().map(|f| {
            c.data
                .get(&f.id)
                .map(|v| f.format_value(v))
                .unwrap_or_default()
        }));
        row.push(c.created_at.chars().take(10).collect());
        table.add_row(row);
    }

    print!("{}", table.render());
    println!("\n{} client(s)", clients.len());
    Ok(())
}
