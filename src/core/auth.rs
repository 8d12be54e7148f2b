use crate::core::context::AppContext;
use crate::db::changes::{ChangeEvent, ChangeKind};
use crate::db::users;
use crate::errors::{AppError, AppResult};
use crate::models::user::User;

/// Session handling: one signed-in identity per database.
pub struct AuthLogic;

impl AuthLogic {
    pub fn sign_in(ctx: &AppContext, email: &str) -> AppResult<User> {
        let user = users::find_by_email(ctx.conn(), email.trim())?
            .ok_or_else(|| AppError::NotFound(format!("user with email '{}'", email.trim())))?;

        users::set_session(ctx.conn(), user.id)?;
        ctx.record(
            &ChangeEvent::new("session", ChangeKind::Insert, user.id),
            &format!("signed in as {}", user.email),
        );

        Ok(user)
    }

    /// Returns false when nobody was signed in.
    pub fn sign_out(ctx: &AppContext) -> AppResult<bool> {
        let current = users::session_user(ctx.conn())?;
        let cleared = users::clear_session(ctx.conn())?;

        if cleared {
            let id = current.as_ref().map(|u| u.id).unwrap_or_default();
            ctx.record(
                &ChangeEvent::new("session", ChangeKind::Delete, id),
                "signed out",
            );
        }

        Ok(cleared)
    }

    pub fn current_user(ctx: &AppContext) -> AppResult<Option<User>> {
        users::session_user(ctx.conn())
    }

    pub fn require_user(ctx: &AppContext) -> AppResult<User> {
        Self::current_user(ctx)?.ok_or(AppError::AuthRequired)
    }

    pub fn require_admin(ctx: &AppContext) -> AppResult<User> {
        let user = Self::require_user(ctx)?;
        if !user.is_admin() {
            return Err(AppError::Forbidden(format!(
                "{} is not an administrator",
                user.email
            )));
        }
        Ok(user)
    }
}
