// src/report/logic.rs

use crate::core::auth::AuthLogic;
use crate::core::context::AppContext;
use crate::db::clients::list_clients;
use crate::errors::{AppError, AppResult};
use crate::models::client::ReportRow;
use crate::models::formula::ReportFormula;
use crate::models::template::{ReportFormat, ReportTemplate};
use crate::report::assemble::{DisplayOptions, ReportTable, assemble};
use crate::report::encode::{Artifact, encode, import_template, output_path, write_artifact};
use crate::report::range::{DateRange, filter_rows};
use crate::ui::messages::warning;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// What goes into a report: columns, derived columns and output format.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSelection {
    pub fields: Vec<String>,
    pub formulas: Vec<ReportFormula>,
    pub format: ReportFormat,
}

impl ReportSelection {
    pub fn new(fields: Vec<String>, formulas: Vec<ReportFormula>, format: ReportFormat) -> Self {
        Self {
            fields,
            formulas,
            format,
        }
    }

    pub fn from_template(t: &ReportTemplate) -> Self {
        Self::new(t.fields.clone(), t.formulas.clone(), t.format)
    }

    /// Replace fields, formulas and format with the template's, in full.
    pub fn apply_template(&mut self, t: &ReportTemplate) {
        self.fields = t.fields.clone();
        self.formulas = t.formulas.clone();
        self.format = t.format;
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.fields.is_empty() && self.formulas.is_empty() {
            return Err(AppError::ValidationFailed(
                "select at least one field or formula".into(),
            ));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for f in &self.fields {
            if !seen.insert(f.as_str()) {
                return Err(AppError::ValidationFailed(format!(
                    "field '{f}' is selected twice"
                )));
            }
        }
        for f in &self.formulas {
            if !seen.insert(f.name.as_str()) {
                return Err(AppError::ValidationFailed(format!(
                    "column name '{}' is used more than once",
                    f.name
                )));
            }
        }

        Ok(())
    }
}

/// Fetch → filter → assemble → encode.
pub struct ReportLogic;

impl ReportLogic {
    /// Rows for the report, in creation order, before any filtering.
    pub fn fetch_rows(ctx: &AppContext) -> AppResult<Vec<ReportRow>> {
        Ok(list_clients(ctx.conn(), false)?
            .iter()
            .map(|c| c.to_report_row())
            .collect())
    }

    pub fn build(
        ctx: &AppContext,
        selection: &ReportSelection,
        range: Option<&DateRange>,
    ) -> AppResult<ReportTable> {
        AuthLogic::require_user(ctx)?;
        selection.validate()?;

        for id in selection.fields.iter().filter(|id| !ctx.catalog.contains(id)) {
            warning(format!("Unknown field '{id}' will be shown as-is."));
        }

        let rows = filter_rows(Self::fetch_rows(ctx)?, range);
        Ok(assemble(
            &rows,
            &selection.fields,
            &selection.formulas,
            &ctx.catalog,
        ))
    }

    /// Title shown in the document and used for the file name.
    pub fn title(ctx: &AppContext, range: Option<&DateRange>) -> String {
        match range {
            Some(r) if r.from.is_some() => format!("{} {}", ctx.config.report_title, r.describe()),
            _ => ctx.config.report_title.clone(),
        }
    }

    pub fn run(
        ctx: &AppContext,
        selection: &ReportSelection,
        range: Option<&DateRange>,
        today: NaiveDate,
    ) -> AppResult<Artifact> {
        let table = Self::build(ctx, selection, range)?;

        if table.is_empty() {
            warning("No clients match the selected range; the report is empty.");
        }

        let title = Self::title(ctx, range);
        let subtitle = format!("Generated {} - {} row(s)", today.format("%Y-%m-%d"), table.len());
        let opts = DisplayOptions {
            currency_fields: ctx.config.currency_fields.clone(),
        };

        encode(&table, selection.format, &title, &subtitle, today, &opts)
    }

    /// Run the report and write it. Nothing is written unless encoding
    /// succeeded.
    pub fn export(
        ctx: &AppContext,
        selection: &ReportSelection,
        range: Option<&DateRange>,
        today: NaiveDate,
        out: Option<&Path>,
        force: bool,
    ) -> AppResult<PathBuf> {
        let artifact = Self::run(ctx, selection, range, today)?;
        let path = output_path(&artifact, out);
        write_artifact(&artifact, &path, force)?;
        Ok(path)
    }

    /// Write the header-only Excel import template for the current catalog.
    pub fn export_import_template(
        ctx: &AppContext,
        today: NaiveDate,
        out: Option<&Path>,
        force: bool,
    ) -> AppResult<PathBuf> {
        let artifact = import_template(ctx.catalog.fields(), today)?;
        let path = output_path(&artifact, out);
        write_artifact(&artifact, &path, force)?;
        Ok(path)
    }
}
