use crate::errors::AppResult;
use crate::models::document::Document;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_document(row: &Row) -> rusqlite::Result<Document> {
    Ok(Document {
        id: row.get("id")?,
        client_id: row.get("client_id")?,
        file_name: row.get("file_name")?,
        storage_key: row.get("storage_key")?,
        content_type: row.get("content_type")?,
        size_bytes: row.get("size_bytes")?,
        uploaded_by: row.get("uploaded_by")?,
        uploaded_at: row.get("uploaded_at")?,
    })
}

pub struct NewDocument<'a> {
    pub client_id: i64,
    pub file_name: &'a str,
    pub storage_key: &'a str,
    pub content_type: &'a str,
    pub size_bytes: i64,
    pub uploaded_by: Option<i64>,
}

pub fn insert_document(conn: &Connection, d: &NewDocument) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO documents
            (client_id, file_name, storage_key, content_type, size_bytes, uploaded_by, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            d.client_id,
            d.file_name,
            d.storage_key,
            d.content_type,
            d.size_bytes,
            d.uploaded_by,
            Local::now().to_rfc3339()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_document(conn: &Connection, id: i64) -> AppResult<Option<Document>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM documents WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_document).optional()?)
}

pub fn list_documents_for_client(conn: &Connection, client_id: i64) -> AppResult<Vec<Document>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM documents WHERE client_id = ?1 ORDER BY uploaded_at ASC, id ASC",
    )?;
    let rows = stmt.query_map([client_id], map_document)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn delete_document(conn: &Connection, id: i64) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM documents WHERE id = ?1", [id])? > 0)
}

/// (count, total bytes) over all documents.
pub fn document_totals(conn: &Connection) -> AppResult<(i64, i64)> {
    Ok(conn.query_row(
        "SELECT COUNT(*), IFNULL(SUM(size_bytes), 0) FROM documents",
        [],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?)
}
