use crate::core::context::AppContext;
use crate::db::log::{LogEntry, load_log};
use crate::errors::AppResult;
use crate::utils::formatting::{pad_right, truncate};
use ansi_term::Colour;
use unicode_width::UnicodeWidthStr;

const TARGET_MAX: usize = 40;

/// ANSI colour for an operation name.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "insert" => Colour::Green,
        "delete" => Colour::Red,
        "update" => Colour::Yellow,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51), // orange
        _ => Colour::White,
    }
}

pub struct LogLogic;

impl LogLogic {
    pub fn entries(ctx: &AppContext) -> AppResult<Vec<LogEntry>> {
        load_log(ctx.conn())
    }

    pub fn print_log(ctx: &AppContext) -> AppResult<()> {
        let entries = Self::entries(ctx)?;

        if entries.is_empty() {
            println!("📜 Internal log is empty.");
            return Ok(());
        }

        let date_of = |e: &LogEntry| {
            chrono::DateTime::parse_from_rfc3339(&e.date)
                .map(|dt| dt.format("%FT%T%:z").to_string())
                .unwrap_or_else(|_| e.date.clone())
        };

        let id_w = entries
            .iter()
            .map(|e| e.id.to_string().len())
            .max()
            .unwrap_or(1);
        let date_w = entries.iter().map(|e| date_of(e).len()).max().unwrap_or(10);
        let op_w = entries
            .iter()
            .map(|e| e.operation.len())
            .max()
            .unwrap_or(6);
        let target_w = entries
            .iter()
            .map(|e| UnicodeWidthStr::width(e.target.as_str()).min(TARGET_MAX))
            .max()
            .unwrap_or(0);

        println!("📜 Internal log:\n");

        for e in &entries {
            // pad before painting: escape codes have no width
            let op = color_for_operation(&e.operation).paint(pad_right(&e.operation, op_w));
            let target = pad_right(&truncate(&e.target, TARGET_MAX), target_w);

            println!(
                "{:>id_w$}: {:<date_w$} | {} {} => {}",
                e.id,
                date_of(e),
                op,
                target,
                e.message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}
