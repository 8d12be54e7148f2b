use crate::core::auth::AuthLogic;
use crate::core::context::AppContext;
use crate::db::changes::{ChangeEvent, ChangeKind};
use crate::db::templates;
use crate::errors::{AppError, AppResult};
use crate::models::template::ReportTemplate;
use crate::report::logic::ReportSelection;

/// Named report presets kept in the record store.
pub struct TemplateLogic;

impl TemplateLogic {
    /// Save `selection` under `name`, owned by the signed-in user.
    pub fn save(ctx: &AppContext, name: &str, selection: &ReportSelection) -> AppResult<i64> {
        let owner = AuthLogic::require_user(ctx)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationFailed("template name cannot be empty".into()));
        }
        selection.validate()?;

        let id = templates::insert_template(
            ctx.conn(),
            name,
            &selection.fields,
            &selection.formulas,
            selection.format,
            owner.id,
        )?;

        ctx.record(
            &ChangeEvent::new("report_templates", ChangeKind::Insert, id),
            &format!("saved template '{name}'"),
        );
        Ok(id)
    }

    /// Every stored template; visibility is not narrowed by owner.
    pub fn list(ctx: &AppContext) -> AppResult<Vec<ReportTemplate>> {
        templates::list_templates(ctx.conn())
    }

    pub fn load(ctx: &AppContext, id: i64) -> AppResult<ReportTemplate> {
        templates::get_template(ctx.conn(), id)?
            .ok_or_else(|| AppError::NotFound(format!("report template #{id}")))
    }

    /// Owners delete their own templates; administrators any.
    pub fn delete(ctx: &AppContext, id: i64) -> AppResult<ReportTemplate> {
        let user = AuthLogic::require_user(ctx)?;
        let template = Self::load(ctx, id)?;

        if template.owner != user.id && !user.is_admin() {
            return Err(AppError::Forbidden(format!(
                "template #{id} belongs to another user"
            )));
        }

        templates::delete_template(ctx.conn(), id)?;
        ctx.record(
            &ChangeEvent::new("report_templates", ChangeKind::Delete, id),
            &format!("deleted template '{}'", template.name),
        );
        Ok(template)
    }
}
