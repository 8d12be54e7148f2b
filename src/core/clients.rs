use crate::core::auth::AuthLogic;
use crate::core::catalog::FieldCatalog;
use crate::core::context::AppContext;
use crate::db::changes::{ChangeEvent, ChangeKind};
use crate::db::{clients, documents};
use crate::errors::{AppError, AppResult};
use crate::models::client::Client;
use crate::models::document::Document;
use crate::models::field::{Field, system_fields};
use crate::ui::messages::warning;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// CRUD over client records plus CSV bulk import.
pub struct ClientLogic;

/// Split a `field=value` assignment as given on the command line.
pub fn parse_assignment(s: &str) -> AppResult<(String, String)> {
    let (k, v) = s.split_once('=').ok_or_else(|| {
        AppError::ValidationFailed(format!("'{s}' must look like field=value"))
    })?;
    let k = k.trim();
    if k.is_empty() {
        return Err(AppError::ValidationFailed(format!("'{s}' has no field name")));
    }
    Ok((k.to_string(), v.to_string()))
}

/// Apply raw `(field, value)` inputs on top of `base`, validating each value
/// against its field type. Empty values clear the field. Required fields
/// must hold a value afterwards.
pub fn apply_values(
    catalog: &FieldCatalog,
    base: BTreeMap<String, Value>,
    values: &[(String, String)],
) -> AppResult<BTreeMap<String, Value>> {
    let mut data = base;

    for (key, raw) in values {
        let field = form_field(catalog, key)?;
        let value = field.parse_value(raw)?;
        if value.is_null() {
            data.remove(&field.id);
        } else {
            data.insert(field.id.clone(), value);
        }
    }

    for f in catalog.fields().iter().filter(|f| f.required) {
        let present = match data.get(&f.id) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(AppError::ValidationFailed(format!("'{}' is required", f.label)));
        }
    }

    Ok(data)
}

/// Resolve a user-supplied key to a writable form field.
fn form_field<'a>(catalog: &'a FieldCatalog, key: &str) -> AppResult<&'a Field> {
    let field = catalog
        .resolve(key)
        .ok_or_else(|| AppError::ValidationFailed(format!("unknown field '{key}'")))?;

    if system_fields().iter().any(|s| s.id == field.id) {
        return Err(AppError::ValidationFailed(format!(
            "'{}' is set automatically and cannot be written",
            field.id
        )));
    }
    Ok(field)
}

impl ClientLogic {
    pub fn create(ctx: &AppContext, values: &[(String, String)]) -> AppResult<Client> {
        let user = AuthLogic::require_user(ctx)?;
        let data = apply_values(&ctx.catalog, BTreeMap::new(), values)?;

        let id = clients::insert_client(ctx.conn(), &data, Some(user.id))?;
        let client = Self::get(ctx, id)?;

        ctx.record(
            &ChangeEvent::new("clients", ChangeKind::Insert, id),
            &format!("created {}", client.display_name()),
        );
        Ok(client)
    }

    pub fn update(ctx: &AppContext, id: i64, values: &[(String, String)]) -> AppResult<Client> {
        AuthLogic::require_user(ctx)?;
        let current = Self::get(ctx, id)?;

        let data = apply_values(&ctx.catalog, current.data, values)?;
        clients::update_client_data(ctx.conn(), id, &data)?;
        let client = Self::get(ctx, id)?;

        ctx.record(
            &ChangeEvent::new("clients", ChangeKind::Update, id),
            &format!("updated {}", client.display_name()),
        );
        Ok(client)
    }

    pub fn get(ctx: &AppContext, id: i64) -> AppResult<Client> {
        clients::get_client(ctx.conn(), id)?
            .ok_or_else(|| AppError::NotFound(format!("client #{id}")))
    }

    pub fn list(ctx: &AppContext, newest_first: bool) -> AppResult<Vec<Client>> {
        AuthLogic::require_user(ctx)?;
        clients::list_clients(ctx.conn(), newest_first)
    }

    /// Direct delete, administrators only.
    pub fn delete(ctx: &AppContext, id: i64) -> AppResult<Client> {
        AuthLogic::require_admin(ctx)?;
        Self::delete_cascade(ctx, id)
    }

    /// Remove a client, its document rows and their blobs. Rows go first in
    /// one statement; blob removal afterwards is best effort and only warns.
    pub(crate) fn delete_cascade(ctx: &AppContext, id: i64) -> AppResult<Client> {
        let client = Self::get(ctx, id)?;
        let docs: Vec<Document> = documents::list_documents_for_client(ctx.conn(), id)?;

        if !clients::delete_client(ctx.conn(), id)? {
            return Err(AppError::NotFound(format!("client #{id}")));
        }

        for d in &docs {
            if let Err(e) = ctx.blobs.remove(&ctx.config.documents_bucket, &d.storage_key) {
                warning(format!("Blob for document #{} not removed: {}", d.id, e));
            }
            ctx.record(
                &ChangeEvent::new("documents", ChangeKind::Delete, d.id),
                &format!("deleted {} with client #{id}", d.file_name),
            );
        }

        ctx.record(
            &ChangeEvent::new("clients", ChangeKind::Delete, id),
            &format!("deleted {}", client.display_name()),
        );
        Ok(client)
    }

    /// Create one client per CSV record. Headers may be field ids or labels.
    /// Every record is validated before anything is written; one bad record
    /// aborts the whole import.
    pub fn import_csv(ctx: &AppContext, path: &Path) -> AppResult<Vec<i64>> {
        let user = AuthLogic::require_user(ctx)?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| AppError::ValidationFailed(format!("CSV open error: {e}")))?;

        let headers = rdr
            .headers()
            .map_err(|e| AppError::ValidationFailed(format!("CSV header error: {e}")))?
            .clone();

        let keys: Vec<String> = headers
            .iter()
            .map(|h| form_field(&ctx.catalog, h).map(|f| f.id.clone()))
            .collect::<AppResult<_>>()?;

        let mut pending: Vec<BTreeMap<String, Value>> = Vec::new();

        for (i, record) in rdr.records().enumerate() {
            // header is line 1
            let line = i + 2;
            let record = record
                .map_err(|e| AppError::ValidationFailed(format!("CSV line {line}: {e}")))?;

            let values: Vec<(String, String)> = keys
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect();

            let data = apply_values(&ctx.catalog, BTreeMap::new(), &values).map_err(|e| match e {
                AppError::ValidationFailed(m) => {
                    AppError::ValidationFailed(format!("CSV line {line}: {m}"))
                }
                other => other,
            })?;
            pending.push(data);
        }

        if pending.is_empty() {
            return Err(AppError::ValidationFailed(format!(
                "{} contains no records",
                path.display()
            )));
        }

        let tx = ctx.conn().unchecked_transaction()?;
        let mut ids = Vec::with_capacity(pending.len());
        for data in &pending {
            ids.push(clients::insert_client(&tx, data, Some(user.id))?);
        }
        tx.commit()?;

        for id in &ids {
            ctx.record(
                &ChangeEvent::new("clients", ChangeKind::Insert, id),
                &format!("imported from {}", path.display()),
            );
        }

        Ok(ids)
    }
}
