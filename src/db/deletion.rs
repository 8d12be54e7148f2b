use crate::errors::{AppError, AppResult};
use crate::models::deletion::{DeletionRequest, DeletionStatus, DeletionTarget};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn conversion_error(msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(AppError::Other(msg)),
    )
}

fn map_request(row: &Row) -> rusqlite::Result<DeletionRequest> {
    let kind: String = row.get("target_kind")?;
    let target_id: i64 = row.get("target_id")?;
    let target = DeletionTarget::from_parts(&kind, target_id)
        .ok_or_else(|| conversion_error(format!("Invalid target kind: {kind}")))?;

    let status_str: String = row.get("status")?;
    let status = DeletionStatus::from_db_str(&status_str)
        .ok_or_else(|| conversion_error(format!("Invalid status: {status_str}")))?;

    Ok(DeletionRequest {
        id: row.get("id")?,
        target,
        requested_by: row.get("requested_by")?,
        reason: row.get("reason")?,
        status,
        reviewed_by: row.get("reviewed_by")?,
        created_at: row.get("created_at")?,
        reviewed_at: row.get("reviewed_at")?,
    })
}

pub fn insert_request(
    conn: &Connection,
    target: DeletionTarget,
    requested_by: i64,
    reason: &str,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO deletion_requests (target_kind, target_id, requested_by, reason, status, created_at)
         VALUES (?1, ?2, ?3, ?4, 'pending', ?5)",
        params![
            target.kind_str(),
            target.id(),
            requested_by,
            reason,
            Local::now().to_rfc3339()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_request(conn: &Connection, id: i64) -> AppResult<Option<DeletionRequest>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM deletion_requests WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_request).optional()?)
}

pub fn find_pending_for(
    conn: &Connection,
    target: DeletionTarget,
) -> AppResult<Option<DeletionRequest>> {
    let mut stmt = conn.prepare_cached(
        "SELECT * FROM deletion_requests
         WHERE target_kind = ?1 AND target_id = ?2 AND status = 'pending'
         LIMIT 1",
    )?;
    Ok(stmt
        .query_row(params![target.kind_str(), target.id()], map_request)
        .optional()?)
}

pub fn list_requests(
    conn: &Connection,
    status: Option<DeletionStatus>,
) -> AppResult<Vec<DeletionRequest>> {
    let mut out = Vec::new();

    match status {
        None => {
            let mut stmt =
                conn.prepare("SELECT * FROM deletion_requests ORDER BY created_at DESC, id DESC")?;
            let rows = stmt.query_map([], map_request)?;
            for r in rows {
                out.push(r?);
            }
        }
        Some(s) => {
            let mut stmt = conn.prepare(
                "SELECT * FROM deletion_requests WHERE status = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt.query_map([s.to_db_str()], map_request)?;
            for r in rows {
                out.push(r?);
            }
        }
    }

    Ok(out)
}

/// Write the review outcome. The status check is the caller's job; this is
/// a plain last-write-wins update of the status field.
pub fn set_status(
    conn: &Connection,
    id: i64,
    status: DeletionStatus,
    reviewed_by: i64,
) -> AppResult<()> {
    let n = conn.execute(
        "UPDATE deletion_requests
         SET status = ?1, reviewed_by = ?2, reviewed_at = ?3
         WHERE id = ?4",
        params![status.to_db_str(), reviewed_by, Local::now().to_rfc3339(), id],
    )?;
    if n == 0 {
        return Err(AppError::NotFound(format!("deletion request #{id}")));
    }
    Ok(())
}

pub fn count_pending(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM deletion_requests WHERE status = 'pending'",
        [],
        |r| r.get(0),
    )?)
}
