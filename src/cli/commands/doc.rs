use crate::cli::parser::DocCmd;
use crate::config::Config;
use crate::core::context::AppContext;
use crate::core::documents::DocumentLogic;
use crate::errors::AppResult;
use crate::report::encode::{Artifact, write_artifact};
use crate::ui::messages::{info, success};
use crate::utils::table::Table;
use chrono::Utc;
use std::path::Path;

pub fn handle(cmd: &DocCmd, cfg: &Config) -> AppResult<()> {
    let ctx = AppContext::open(cfg)?;

    match cmd {
        DocCmd::Upload { client, file } => {
            let doc = DocumentLogic::upload(&ctx, *client, Path::new(file))?;
            success(format!(
                "Uploaded {} as document #{} ({}, {})",
                doc.file_name,
                doc.id,
                doc.content_type,
                doc.human_size()
            ));
        }
        DocCmd::List { client } => {
            let docs = DocumentLogic::list(&ctx, *client)?;
            if docs.is_empty() {
                info(format!("Client #{} has no documents.", client));
                return Ok(());
            }

            let mut table = Table::new(&["ID", "File", "Type", "Size", "Uploaded"]);
            for d in &docs {
                table.add_row(vec![
                    d.id.to_string(),
                    d.file_name.clone(),
                    d.content_type.clone(),
                    d.human_size(),
                    d.uploaded_at.chars().take(10).collect(),
                ]);
            }
            print!("{}", table.render());
        }
        DocCmd::Get { id, out, force } => {
            let out = out.as_deref().unwrap_or(".");
            let path = DocumentLogic::download_to(&ctx, *id, Path::new(out), *force)?;
            success(format!("Saved document #{} to {}", id, path.display()));
        }
        DocCmd::Url { id } => {
            let signed = DocumentLogic::signed_url(&ctx, *id, Utc::now())?;
            println!("{}", signed.url);
            info(format!("Valid until {}", signed.expires_at.to_rfc3339()));
        }
        DocCmd::Fetch { url, out, force } => {
            let bytes = DocumentLogic::download_signed(&ctx, url, Utc::now())?;
            let artifact = Artifact {
                bytes,
                filename: out.clone(),
            };
            write_artifact(&artifact, Path::new(out), *force)?;
            success(format!("Saved {} byte(s) to {}", artifact.bytes.len(), out));
        }
        DocCmd::Del { id } => {
            let doc = DocumentLogic::delete(&ctx, *id)?;
            success(format!("Deleted document #{} {}", doc.id, doc.file_name));
        }
    }

    Ok(())
}
