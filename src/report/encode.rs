// src/report/encode.rs

use crate::errors::{AppError, AppResult};
use crate::models::field::Field;
use crate::models::template::ReportFormat;
use crate::report::assemble::{DisplayOptions, ReportTable};
use crate::report::pdf::PdfManager;
use crate::report::xlsx::{encode_import_template, encode_xlsx};
use crate::utils::formatting::slugify;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// A fully encoded export, ready to be written or handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Above this many columns the PDF switches to landscape.
const LANDSCAPE_COLUMNS: usize = 6;

/// `<slug(title)>_<YYYY-MM-DD>.<ext>`
pub fn report_filename(title: &str, format: ReportFormat, today: NaiveDate) -> String {
    format!("{}_{}.{}", slugify(title), today.format("%Y-%m-%d"), format.extension())
}

/// Encode a table in memory. Either the whole artifact is returned or an
/// error; nothing touches the filesystem here.
pub fn encode(
    table: &ReportTable,
    format: ReportFormat,
    title: &str,
    subtitle: &str,
    today: NaiveDate,
    opts: &DisplayOptions,
) -> AppResult<Artifact> {
    if table.columns.is_empty() {
        return Err(AppError::Export("report has no columns".into()));
    }

    let bytes = match format {
        ReportFormat::Excel => encode_xlsx(table, opts)?,
        ReportFormat::Pdf => {
            let mut pdf = PdfManager::new(table.columns.len() > LANDSCAPE_COLUMNS);
            pdf.write_table(title, subtitle, &table.headers(), &table.display_rows(opts));
            pdf.finish()
        }
    };

    Ok(Artifact {
        bytes,
        filename: report_filename(title, format, today),
    })
}

/// Header-only workbook listing `fields`, used to prepare bulk imports.
pub fn import_template(fields: &[Field], today: NaiveDate) -> AppResult<Artifact> {
    if fields.is_empty() {
        return Err(AppError::Export("no fields to put in the template".into()));
    }

    Ok(Artifact {
        bytes: encode_import_template(fields)?,
        filename: report_filename("import template", ReportFormat::Excel, today),
    })
}

/// Resolve the output path: a directory (or nothing) gets the artifact's
/// own file name appended.
pub fn output_path(artifact: &Artifact, out: Option<&Path>) -> PathBuf {
    match out {
        None => PathBuf::from(&artifact.filename),
        Some(p) if p.is_dir() => p.join(&artifact.filename),
        Some(p) => p.to_path_buf(),
    }
}

/// Write the artifact to `path`. The bytes go to a sibling temp file which
/// is renamed into place, so a failed write never leaves a partial file
/// under the final name.
pub fn write_artifact(artifact: &Artifact, path: &Path, force: bool) -> AppResult<()> {
    if path.exists() && !force {
        return Err(AppError::Export(format!(
            "'{}' already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::Export(format!("invalid output path '{}'", path.display())))?;
    let tmp = path.with_file_name(format!(".{file_name}.part"));

    if let Err(e) = fs::write(&tmp, &artifact.bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    Ok(())
}
