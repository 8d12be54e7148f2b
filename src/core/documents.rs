use crate::core::auth::AuthLogic;
use crate::core::context::AppContext;
use crate::db::changes::{ChangeEvent, ChangeKind};
use crate::db::documents::{self, NewDocument};
use crate::db::clients;
use crate::errors::{AppError, AppResult};
use crate::models::document::Document;
use crate::report::encode::{Artifact, write_artifact};
use crate::storage::{SignedUrl, sanitize_file_name};
use crate::ui::messages::warning;
use chrono::{DateTime, Duration, Utc};
use mime_guess::from_path;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Client attachments: blob in the documents bucket + metadata row.
pub struct DocumentLogic;

impl DocumentLogic {
    /// Store `bytes` as a new document of `client_id`. The blob is uploaded
    /// first; if the metadata insert then fails the blob is removed again.
    pub fn upload_bytes(
        ctx: &AppContext,
        client_id: i64,
        file_name: &str,
        bytes: &[u8],
    ) -> AppResult<Document> {
        let user = AuthLogic::require_user(ctx)?;

        if clients::get_client(ctx.conn(), client_id)?.is_none() {
            return Err(AppError::NotFound(format!("client #{client_id}")));
        }

        let file_name = file_name.trim();
        if file_name.is_empty() {
            return Err(AppError::ValidationFailed("file name cannot be empty".into()));
        }

        let bucket = &ctx.config.documents_bucket;
        let storage_key = format!(
            "{}/{}_{}",
            client_id,
            Uuid::new_v4().simple(),
            sanitize_file_name(file_name)
        );
        let content_type = from_path(file_name).first_or_octet_stream().to_string();

        ctx.blobs.upload(bucket, &storage_key, bytes)?;

        let inserted = documents::insert_document(
            ctx.conn(),
            &NewDocument {
                client_id,
                file_name,
                storage_key: &storage_key,
                content_type: &content_type,
                size_bytes: bytes.len() as i64,
                uploaded_by: Some(user.id),
            },
        );

        let id = match inserted {
            Ok(id) => id,
            Err(e) => {
                if let Err(cleanup) = ctx.blobs.remove(bucket, &storage_key) {
                    warning(format!("Orphaned blob {bucket}/{storage_key}: {cleanup}"));
                }
                return Err(e);
            }
        };

        ctx.record(
            &ChangeEvent::new("documents", ChangeKind::Insert, id),
            &format!("uploaded {} for client #{client_id}", file_name),
        );

        Self::get(ctx, id)
    }

    pub fn upload(ctx: &AppContext, client_id: i64, path: &Path) -> AppResult<Document> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::ValidationFailed(format!("'{}' is not a file", path.display())))?;

        Self::upload_bytes(ctx, client_id, &name, &bytes)
    }

    pub fn get(ctx: &AppContext, id: i64) -> AppResult<Document> {
        documents::get_document(ctx.conn(), id)?
            .ok_or_else(|| AppError::NotFound(format!("document #{id}")))
    }

    pub fn list(ctx: &AppContext, client_id: i64) -> AppResult<Vec<Document>> {
        AuthLogic::require_user(ctx)?;
        if clients::get_client(ctx.conn(), client_id)?.is_none() {
            return Err(AppError::NotFound(format!("client #{client_id}")));
        }
        documents::list_documents_for_client(ctx.conn(), client_id)
    }

    pub fn download(ctx: &AppContext, id: i64) -> AppResult<(Document, Vec<u8>)> {
        AuthLogic::require_user(ctx)?;
        let doc = Self::get(ctx, id)?;
        let bytes = ctx
            .blobs
            .download(&ctx.config.documents_bucket, &doc.storage_key)?;
        Ok((doc, bytes))
    }

    /// Save a document under `out` (a file path or a directory).
    pub fn download_to(ctx: &AppContext, id: i64, out: &Path, force: bool) -> AppResult<PathBuf> {
        let (doc, bytes) = Self::download(ctx, id)?;
        let path = if out.is_dir() {
            out.join(sanitize_file_name(&doc.file_name))
        } else {
            out.to_path_buf()
        };

        let artifact = Artifact {
            bytes,
            filename: doc.file_name,
        };
        write_artifact(&artifact, &path, force)?;
        Ok(path)
    }

    /// Time-limited read link, valid for the configured lifetime.
    pub fn signed_url(ctx: &AppContext, id: i64, now: DateTime<Utc>) -> AppResult<SignedUrl> {
        AuthLogic::require_user(ctx)?;
        let doc = Self::get(ctx, id)?;
        ctx.blobs.signed_url(
            &ctx.config.documents_bucket,
            &doc.storage_key,
            Duration::seconds(ctx.config.signed_url_ttl_secs),
            now,
        )
    }

    /// Resolve a signed link. The link itself is the credential; no session
    /// is needed.
    pub fn download_signed(ctx: &AppContext, url: &str, now: DateTime<Utc>) -> AppResult<Vec<u8>> {
        let (bucket, key) = ctx.blobs.verify_url(url, now)?;
        ctx.blobs.download(&bucket, &key)
    }

    /// Direct delete, administrators only.
    pub fn delete(ctx: &AppContext, id: i64) -> AppResult<Document> {
        AuthLogic::require_admin(ctx)?;
        Self::delete_cascade(ctx, id)
    }

    /// Remove the metadata row, then the blob. A blob that cannot be removed
    /// is reported as an upstream failure; the row stays deleted.
    pub(crate) fn delete_cascade(ctx: &AppContext, id: i64) -> AppResult<Document> {
        let doc = Self::get(ctx, id)?;

        if !documents::delete_document(ctx.conn(), id)? {
            return Err(AppError::NotFound(format!("document #{id}")));
        }
        ctx.record(
            &ChangeEvent::new("documents", ChangeKind::Delete, id),
            &format!("deleted {}", doc.file_name),
        );

        ctx.blobs
            .remove(&ctx.config.documents_bucket, &doc.storage_key)
            .map_err(|e| {
                AppError::Upstream(format!(
                    "document #{id} deleted but its blob was not removed: {e}"
                ))
            })?;

        Ok(doc)
    }
}
