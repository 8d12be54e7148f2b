use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::core::dashboard::DashboardLogic;
use crate::errors::AppResult;
use crate::ui::messages::header;
use crate::utils::date::today;
use crate::utils::formatting::{bar, pad_left, pad_right};
use unicode_width::UnicodeWidthStr;

const BAR_WIDTH: usize = 30;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Dashboard { months, by } = cmd {
        let ctx = AppContext::open(cfg)?;
        let d = DashboardLogic::compute(&ctx, today(), *months, by.as_deref())?;

        header("Dashboard");
        println!("{:<26}{}", "Clients", d.total_clients);
        println!("{:<26}{}", "New this month", d.new_this_month);
        println!(
            "{:<26}{} ({} bytes)",
            "Documents", d.documents, d.document_bytes
        );
        println!("{:<26}{}", "Pending deletion requests", d.pending_deletions);

        if !d.monthly.is_empty() {
            println!("\n📈 Clients created per month:");
            let max = d.monthly.iter().map(|(_, n)| *n).max().unwrap_or(0) as usize;
            for (month, n) in &d.monthly {
                println!(
                    "  {} {} {}",
                    month,
                    pad_left(&n.to_string(), 4),
                    bar(*n as usize, max, BAR_WIDTH)
                );
            }
        }

        if let Some(dist) = &d.distribution {
            println!("\n📊 Clients by {}:", ctx.catalog.label(&dist.field));
            let label_w = dist
                .buckets
                .iter()
                .map(|(k, _)| UnicodeWidthStr::width(k.as_str()))
                .max()
                .unwrap_or(0);
            let max = dist.buckets.iter().map(|(_, n)| *n).max().unwrap_or(0) as usize;
            for (label, n) in &dist.buckets {
                println!(
                    "  {} {} {}",
                    pad_right(label, label_w),
                    pad_left(&n.to_string(), 4),
                    bar(*n as usize, max, BAR_WIDTH)
                );
            }
        }
    }

    Ok(())
}
