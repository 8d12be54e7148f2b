use crate::errors::{AppError, AppResult};
use crate::models::field::{Field, FieldType};
use rusqlite::{Connection, Row, params};

fn map_field(row: &Row) -> rusqlite::Result<Field> {
    let kind_str: String = row.get("kind")?;
    let kind = FieldType::from_db_str(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::Other(format!("Invalid field type: {kind_str}"))),
        )
    })?;

    let options: Option<String> = row.get("options")?;
    let options = match options {
        Some(raw) => Some(serde_json::from_str::<Vec<String>>(&raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };

    Ok(Field {
        id: row.get("id")?,
        label: row.get("label")?,
        kind,
        required: row.get::<_, i64>("required")? == 1,
        options,
    })
}

pub fn count_fields(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM fields", [], |r| r.get(0))?)
}

pub fn load_fields(conn: &Connection) -> AppResult<Vec<Field>> {
    let mut stmt = conn.prepare("SELECT * FROM fields ORDER BY position ASC, id ASC")?;
    let rows = stmt.query_map([], map_field)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn next_position(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT IFNULL(MAX(position), -1) + 1 FROM fields",
        [],
        |r| r.get(0),
    )?)
}

pub fn insert_field(conn: &Connection, f: &Field, position: i64) -> AppResult<()> {
    let options = match &f.options {
        Some(o) => Some(serde_json::to_string(o)?),
        None => None,
    };

    conn.execute(
        "INSERT INTO fields (id, label, kind, required, options, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            f.id,
            f.label,
            f.kind.as_str(),
            if f.required { 1 } else { 0 },
            options,
            position
        ],
    )?;
    Ok(())
}

pub fn delete_field(conn: &Connection, id: &str) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM fields WHERE id = ?1", [id])? > 0)
}
