use crate::cli::parser::DeletionCmd;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::core::deletion::{DeletionLogic, ReviewOutcome};
use crate::errors::{AppError, AppResult};
use crate::models::deletion::DeletionTarget;
use crate::ui::messages::{error, info, notify, success};
use crate::utils::table::Table;

pub fn handle(cmd: &DeletionCmd, cfg: &Config) -> AppResult<()> {
    let ctx = AppContext::open(cfg)?;

    match cmd {
        DeletionCmd::Request {
            client,
            document,
            reason,
        } => {
            let target = match (client, document) {
                (Some(id), None) => DeletionTarget::Client(*id),
                (None, Some(id)) => DeletionTarget::Document(*id),
                _ => {
                    return Err(AppError::ValidationFailed(
                        "give either --client or --document".into(),
                    ));
                }
            };

            let req = DeletionLogic::request(&ctx, target, reason)?;
            success(format!(
                "Deletion request #{} for {} is pending review",
                req.id, req.target
            ));
        }
        DeletionCmd::List { status } => {
            let requests = DeletionLogic::list(&ctx, *status)?;
            if requests.is_empty() {
                info("No deletion requests.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "Target", "Status", "By", "Reason", "Created"]);
            for r in requests {
                table.add_row(vec![
                    r.id.to_string(),
                    r.target.to_string(),
                    r.status.to_db_str().to_string(),
                    format!("#{}", r.requested_by),
                    r.reason,
                    r.created_at.chars().take(10).collect(),
                ]);
            }
            print!("{}", table.render());
        }
        DeletionCmd::Approve { id } => report(DeletionLogic::approve(&ctx, *id)?),
        DeletionCmd::Reject { id } => report(DeletionLogic::reject(&ctx, *id)?),
    }

    Ok(())
}

fn report(outcome: ReviewOutcome) {
    let req = &outcome.request;
    success(format!(
        "Deletion request #{} {}",
        req.id,
        req.status.to_db_str()
    ));

    if let Some(e) = &outcome.cascade_error {
        error(format!(
            "Request #{} is approved but deleting {} failed; reconcile manually.",
            req.id, req.target
        ));
        notify(e);
    }
}
