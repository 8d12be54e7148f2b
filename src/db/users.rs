use crate::errors::{AppError, AppResult};
use crate::models::user::{Role, User};
use chrono::Local;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_user(row: &Row) -> rusqlite::Result<User> {
    let role_str: String = row.get("role")?;
    let role = Role::from_db_str(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::Other(format!("Invalid role: {role_str}"))),
        )
    })?;

    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        name: row.get("name")?,
        role,
        created_at: row.get("created_at")?,
    })
}

pub fn count_users(conn: &Connection) -> AppResult<i64> {
    Ok(conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?)
}

pub fn insert_user(conn: &Connection, email: &str, name: &str, role: Role) -> AppResult<User> {
    conn.execute(
        "INSERT INTO users (email, name, role, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![email, name, role.to_db_str(), Local::now().to_rfc3339()],
    )?;
    let id = conn.last_insert_rowid();
    get_user(conn, id)?.ok_or_else(|| AppError::NotFound(format!("user #{id}")))
}

pub fn get_user(conn: &Connection, id: i64) -> AppResult<Option<User>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM users WHERE id = ?1")?;
    Ok(stmt.query_row([id], map_user).optional()?)
}

pub fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<User>> {
    let mut stmt = conn.prepare_cached("SELECT * FROM users WHERE lower(email) = lower(?1)")?;
    Ok(stmt.query_row([email], map_user).optional()?)
}

pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users ORDER BY id ASC")?;
    let rows = stmt.query_map([], map_user)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------
// Session (single signed-in identity per database)
// ---------------------------

pub fn set_session(conn: &Connection, user_id: i64) -> AppResult<()> {
    conn.execute(
        "INSERT INTO session (id, user_id, signed_in_at) VALUES (1, ?1, ?2)
         ON CONFLICT(id) DO UPDATE SET user_id = excluded.user_id,
                                       signed_in_at = excluded.signed_in_at",
        params![user_id, Local::now().to_rfc3339()],
    )?;
    Ok(())
}

pub fn clear_session(conn: &Connection) -> AppResult<bool> {
    Ok(conn.execute("DELETE FROM session", [])? > 0)
}

pub fn session_user(conn: &Connection) -> AppResult<Option<User>> {
    let mut stmt = conn.prepare_cached(
        "SELECT u.* FROM session s JOIN users u ON u.id = s.user_id WHERE s.id = 1",
    )?;
    Ok(stmt.query_row([], map_user).optional()?)
}

/// Remove a user and everything that hangs off it, in one transaction.
///
/// Owned templates, requests and the session go away; clients and documents
/// the user created are kept and lose their author reference.
pub fn delete_user_cascade(conn: &Connection, id: i64) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute("DELETE FROM session WHERE user_id = ?1", [id])?;
    tx.execute("DELETE FROM report_templates WHERE owner = ?1", [id])?;
    tx.execute("DELETE FROM deletion_requests WHERE requested_by = ?1", [id])?;
    tx.execute(
        "UPDATE deletion_requests SET reviewed_by = NULL WHERE reviewed_by = ?1",
        [id],
    )?;
    tx.execute(
        "UPDATE documents SET uploaded_by = NULL WHERE uploaded_by = ?1",
        [id],
    )?;
    tx.execute(
        "UPDATE clients SET created_by = NULL WHERE created_by = ?1",
        [id],
    )?;

    let n = tx.execute("DELETE FROM users WHERE id = ?1", [id])?;
    if n == 0 {
        return Err(AppError::NotFound(format!("user #{id}")));
    }

    tx.commit()?;
    Ok(())
}
