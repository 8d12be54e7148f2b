use crate::errors::{AppError, AppResult};
use crate::models::formula::ReportFormula;
use crate::models::template::{ReportFormat, ReportTemplate};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn json_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
}

fn map_template(row: &Row) -> rusqlite::Result<ReportTemplate> {
    let fields: String = row.get("fields")?;
    let formulas: String = row.get("formulas")?;
    let format: String = row.get("format")?;

    Ok(ReportTemplate {
        id: row.get("id")?,
        name: row.get("name")?,
        fields: serde_json::from_str(&fields).map_err(json_error)?,
        formulas: serde_json::from_str(&formulas).map_err(json_error)?,
        format: ReportFormat::from_db_str(&format).ok_or_else(|| {
            json_error(AppError::InvalidExportFormat(format.clone()))
        })?,
        owner: row.get("owner")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_template(
    conn: &Connection,
    name: &str,
    fields: &[String],
    formulas: &[ReportFormula],
    format: ReportFormat,
    owner: i64,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO report_templates (name, fields, formulas, format, owner, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            name,
            serde_json::to_string(fields)?,
            serde_json::to_string(formulas)?,
            format.as_str(),
            owner,
            Local::now().to_rfc3339()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_template(conn: &Connection, id: i64) -> AppResult<Option<ReportTemplate>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM report_templates WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_template).optional()?)
}

pub fn list_templates(conn: &Connection) -> AppResult<Vec<ReportTemplate>> {
    let mut stmt = conn.prepare("SELECT * FROM report_templates ORDER BY name ASC, id ASC")?;
    let rows = stmt.query_map([], map_template)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn delete_template(conn: &Connection, id: i64) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM report_templates WHERE id = ?1", [id])? > 0)
}
