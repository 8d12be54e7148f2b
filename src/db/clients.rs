use crate::errors::{AppError, AppResult};
use crate::models::client::Client;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde_json::Value;
use std::collections::BTreeMap;

pub fn map_client(row: &Row) -> rusqlite::Result<Client> {
    let raw: String = row.get("data")?;
    let data: BTreeMap<String, Value> = serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Client {
        id: row.get("id")?,
        data,
        created_by: row.get("created_by")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn insert_client(
    conn: &Connection,
    data: &BTreeMap<String, Value>,
    created_by: Option<i64>,
) -> AppResult<i64> {
    let now = Local::now().to_rfc3339();
    conn.execute(
        "INSERT INTO clients (data, created_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3)",
        params![serde_json::to_string(data)?, created_by, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_client_data(
    conn: &Connection,
    id: i64,
    data: &BTreeMap<String, Value>,
) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE clients SET data = ?1, updated_at = ?2 WHERE id = ?3",
        params![serde_json::to_string(data)?, Local::now().to_rfc3339(), id],
    )?;
    if n == 0 {
        return Err(AppError::NotFound(format!("client #{id}")));
    }
    Ok(())
}

pub fn get_client(conn: &Connection, id: i64) -> AppResult<Option<Client>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM clients WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_client).optional()?)
}

/// All clients in creation order (oldest first, or newest first).
pub fn list_clients(conn: &Connection, newest_first: bool) -> AppResult<Vec<Client>> {
    let sql = if newest_first {
        "SELECT * FROM clients ORDER BY created_at DESC, id DESC"
    } else {
        "SELECT * FROM clients ORDER BY created_at ASC, id ASC"
    };

    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map([], map_client)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn delete_client(conn: &Connection, id: i64) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM clients WHERE id = ?1", [id])? > 0)
}

pub fn count_clients(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM clients", [], |r| r.get(0))?)
}

/// Number of clients holding a non-empty value for `field_id`.
pub fn count_clients_with_field(conn: &Connection, field_id: &str) -> AppResult<i64> {
    let path = format!("$.{field_id}");
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM clients
         WHERE json_extract(data, ?1) IS NOT NULL
           AND json_extract(data, ?1) != ''",
        [path],
        |r| r.get(0),
    )?)
}

/// Clients whose creation day lies in the inclusive `[from, to]` window,
/// oldest first. Days are `YYYY-MM-DD`.
pub fn list_clients_created_between(
    conn: &Connection,
    from: &str,
    to: &str,
) -> AppResult<Vec<Client>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM clients
         WHERE substr(created_at, 1, 10) BETWEEN ?1 AND ?2
         ORDER BY created_at ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![from, to], map_client)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Creation count per `YYYY-MM` month key.
pub fn count_clients_by_month(conn: &Connection) -> AppResult<BTreeMap<String, i64>> {
    let mut stmt = conn.prepare(
        "SELECT substr(created_at, 1, 7) AS month, COUNT(*)
         FROM clients
         GROUP BY month",
    )?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;

    let mut out = BTreeMap::new();
    for r in rows {
        let (month, n) = r?;
        out.insert(month, n);
    }
    Ok(out)
}
