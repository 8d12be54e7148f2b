use crate::core::auth::AuthLogic;
use crate::core::context::AppContext;
use crate::db::changes::{ChangeEvent, ChangeKind};
use crate::db::users;
use crate::errors::{AppError, AppResult};
use crate::models::user::{Role, User};

/// User provisioning (create / cascading delete).
pub struct UserLogic;

impl UserLogic {
    /// Create a user. On an empty database the first user is created
    /// without a session and always becomes an administrator.
    pub fn create(ctx: &AppContext, email: &str, name: &str, role: Role) -> AppResult<User> {
        let email = email.trim();
        let name = name.trim();

        let bootstrap = users::count_users(ctx.conn())? == 0;
        if !bootstrap {
            AuthLogic::require_admin(ctx)?;
        }

        if email.is_empty() || !email.contains('@') {
            return Err(AppError::ValidationFailed(format!(
                "'{email}' is not a valid email address"
            )));
        }
        if name.is_empty() {
            return Err(AppError::ValidationFailed("user name cannot be empty".into()));
        }
        if users::find_by_email(ctx.conn(), email)?.is_some() {
            return Err(AppError::ValidationFailed(format!(
                "a user with email '{email}' already exists"
            )));
        }

        let role = if bootstrap { Role::Admin } else { role };
        let user = users::insert_user(ctx.conn(), email, name, role)?;

        ctx.record(
            &ChangeEvent::new("users", ChangeKind::Insert, user.id),
            &format!("created {} ({})", user.email, user.role.to_db_str()),
        );

        Ok(user)
    }

    pub fn list(ctx: &AppContext) -> AppResult<Vec<User>> {
        AuthLogic::require_user(ctx)?;
        users::list_users(ctx.conn())
    }

    /// Remove a user together with their session, templates and requests.
    pub fn delete(ctx: &AppContext, id: i64) -> AppResult<User> {
        let admin = AuthLogic::require_admin(ctx)?;
        if admin.id == id {
            return Err(AppError::ValidationFailed(
                "you cannot delete your own account".into(),
            ));
        }

        let user = users::get_user(ctx.conn(), id)?
            .ok_or_else(|| AppError::NotFound(format!("user #{id}")))?;

        users::delete_user_cascade(ctx.conn(), id)?;

        ctx.record(
            &ChangeEvent::new("users", ChangeKind::Delete, id),
            &format!("deleted {}", user.email),
        );

        Ok(user)
    }
}
