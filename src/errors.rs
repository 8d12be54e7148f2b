//! Unified application error type.
//! All modules (db, core, report, cli) return AppError so failures surface
//! to the caller as one user-facing notification.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Identity / permissions
    // ---------------------------
    #[error("Authentication required: sign in with `rcrm login <email>`")]
    AuthRequired,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // ---------------------------
    // Domain errors
    // ---------------------------
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("A deletion request is already pending for {0}")]
    AlreadyPending(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export format not supported: {0}")]
    InvalidExportFormat(String),

    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Other(format!("JSON error: {e}"))
    }
}

pub type AppResult<T> = Result<T, AppError>;
