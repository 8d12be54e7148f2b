use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result, params};

/// Ensure that the `log` table exists. Every other migration records itself
/// there, so this one runs unconditionally.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )
}

struct Migration {
    version: &'static str,
    message: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250301_0001_create_users_session",
        message: "Created users and session tables",
        sql: r#"
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            email       TEXT NOT NULL UNIQUE,
            name        TEXT NOT NULL,
            role        TEXT NOT NULL DEFAULT 'user' CHECK(role IN ('admin','user')),
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS session (
            id            INTEGER PRIMARY KEY CHECK(id = 1),
            user_id       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            signed_in_at  TEXT NOT NULL
        );
        "#,
    },
    Migration {
        version: "20250301_0002_create_fields",
        message: "Created fields table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS fields (
            id        TEXT PRIMARY KEY,
            label     TEXT NOT NULL,
            kind      TEXT NOT NULL,
            required  INTEGER NOT NULL DEFAULT 0,
            options   TEXT,
            position  INTEGER NOT NULL DEFAULT 0
        );
        "#,
    },
    Migration {
        version: "20250301_0003_create_clients",
        message: "Created clients table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS clients (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            data        TEXT NOT NULL DEFAULT '{}',
            created_by  INTEGER REFERENCES users(id) ON DELETE SET NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_clients_created_at ON clients(created_at);
        "#,
    },
    Migration {
        version: "20250301_0004_create_documents",
        message: "Created documents table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS documents (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id     INTEGER NOT NULL REFERENCES clients(id) ON DELETE CASCADE,
            file_name     TEXT NOT NULL,
            storage_key   TEXT NOT NULL UNIQUE,
            content_type  TEXT NOT NULL DEFAULT 'application/octet-stream',
            size_bytes    INTEGER NOT NULL DEFAULT 0,
            uploaded_by   INTEGER REFERENCES users(id) ON DELETE SET NULL,
            uploaded_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_documents_client ON documents(client_id);
        "#,
    },
    Migration {
        version: "20250301_0005_create_deletion_requests",
        message: "Created deletion_requests table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS deletion_requests (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            target_kind   TEXT NOT NULL CHECK(target_kind IN ('client','document')),
            target_id     INTEGER NOT NULL,
            requested_by  INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            reason        TEXT NOT NULL,
            status        TEXT NOT NULL DEFAULT 'pending'
                          CHECK(status IN ('pending','approved','rejected')),
            reviewed_by   INTEGER REFERENCES users(id) ON DELETE SET NULL,
            created_at    TEXT NOT NULL,
            reviewed_at   TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_deletion_target
            ON deletion_requests(target_kind, target_id, status);
        "#,
    },
    Migration {
        version: "20250301_0006_create_report_templates",
        message: "Created report_templates table",
        sql: r#"
        CREATE TABLE IF NOT EXISTS report_templates (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            fields      TEXT NOT NULL,
            formulas    TEXT NOT NULL DEFAULT '[]',
            format      TEXT NOT NULL CHECK(format IN ('pdf','excel')),
            owner       INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at  TEXT NOT NULL
        );
        "#,
    },
];

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn apply(conn: &Connection, m: &Migration) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(m.sql)?;
    tx.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        params![m.version, m.message],
    )?;
    tx.commit()
}

/// Public entry point: run all pending migrations, in order.
///
/// Returns the versions applied by this call.
pub fn run_pending_migrations(conn: &Connection) -> Result<Vec<&'static str>> {
    ensure_log_table(conn)?;

    let mut applied = Vec::new();
    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }
        apply(conn, m)?;
        applied.push(m.version);
    }

    if !applied.is_empty() {
        success(format!("Applied {} database migration(s).", applied.len()));
    }

    Ok(applied)
}
