use crate::db::fields;
use crate::db::migrate::run_pending_migrations;
use crate::errors::{AppError, AppResult};
use crate::models::field::default_fields;
use rusqlite::Connection;

/// Initialize the database.
/// Schema is owned by the migration engine; the default form catalog is
/// seeded only while the `fields` table is still empty.
pub fn init_db(conn: &Connection) -> AppResult<()> {
    run_pending_migrations(conn).map_err(|e| AppError::Migration(e.to_string()))?;

    if fields::count_fields(conn)? == 0 {
        for (pos, f) in default_fields().iter().enumerate() {
            fields::insert_field(conn, f, pos as i64)?;
        }
    }

    Ok(())
}
