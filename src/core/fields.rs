use crate::core::auth::AuthLogic;
use crate::core::catalog::FieldCatalog;
use crate::core::context::AppContext;
use crate::db::changes::{ChangeEvent, ChangeKind};
use crate::db::{clients, fields};
use crate::errors::{AppError, AppResult};
use crate::models::field::Field;

/// Maintenance of the form field catalog.
pub struct FieldLogic;

impl FieldLogic {
    pub fn list(ctx: &AppContext) -> &[Field] {
        ctx.catalog.fields()
    }

    /// Append a field to the catalog (admin only).
    pub fn add(ctx: &mut AppContext, field: Field) -> AppResult<()> {
        AuthLogic::require_admin(ctx)?;

        // Validates the definition and rejects duplicate ids.
        let mut next = ctx.catalog.fields().to_vec();
        next.push(field.clone());
        FieldCatalog::new(next)?;

        let position = fields::next_position(ctx.conn())?;
        fields::insert_field(ctx.conn(), &field, position)?;
        ctx.reload_catalog()?;

        ctx.record(
            &ChangeEvent::new("fields", ChangeKind::Insert, &field.id),
            &format!("added field '{}' ({})", field.id, field.kind.as_str()),
        );

        Ok(())
    }

    /// Drop a field. Fields that already hold client data are immutable.
    pub fn remove(ctx: &mut AppContext, id: &str) -> AppResult<()> {
        AuthLogic::require_admin(ctx)?;

        if ctx.catalog.fields().iter().all(|f| f.id != id) {
            return Err(AppError::NotFound(format!("field '{id}'")));
        }

        let used = clients::count_clients_with_field(ctx.conn(), id)?;
        if used > 0 {
            return Err(AppError::ValidationFailed(format!(
                "field '{id}' is used by {used} client(s) and cannot be removed"
            )));
        }

        fields::delete_field(ctx.conn(), id)?;
        ctx.reload_catalog()?;

        ctx.record(
            &ChangeEvent::new("fields", ChangeKind::Delete, id),
            &format!("removed field '{id}'"),
        );

        Ok(())
    }
}
