use crate::core::auth::AuthLogic;
use crate::core::clients::ClientLogic;
use crate::core::context::AppContext;
use crate::core::documents::DocumentLogic;
use crate::db::changes::{ChangeEvent, ChangeKind};
use crate::db::{clients, deletion, documents};
use crate::errors::{AppError, AppResult};
use crate::models::deletion::{DeletionRequest, DeletionStatus, DeletionTarget};

/// Approval-gated deletion of clients and documents.
///
/// `pending` → `approved` | `rejected`; both outcomes are final. Approval
/// deletes the target as a follow-up step. If that step fails the request
/// stays `approved` and the failure is handed back in
/// [`ReviewOutcome::cascade_error`] for manual reconciliation.
pub struct DeletionLogic;

#[derive(Debug)]
pub struct ReviewOutcome {
    pub request: DeletionRequest,
    pub cascade_error: Option<AppError>,
}

impl DeletionLogic {
    pub fn request(
        ctx: &AppContext,
        target: DeletionTarget,
        reason: &str,
    ) -> AppResult<DeletionRequest> {
        let user = AuthLogic::require_user(ctx)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::ValidationFailed(
                "a deletion request needs a reason".into(),
            ));
        }

        let exists = match target {
            DeletionTarget::Client(id) => clients::get_client(ctx.conn(), id)?.is_some(),
            DeletionTarget::Document(id) => documents::get_document(ctx.conn(), id)?.is_some(),
        };
        if !exists {
            return Err(AppError::NotFound(target.to_string()));
        }

        if deletion::find_pending_for(ctx.conn(), target)?.is_some() {
            return Err(AppError::AlreadyPending(target.to_string()));
        }

        let id = deletion::insert_request(ctx.conn(), target, user.id, reason)?;
        ctx.record(
            &ChangeEvent::new("deletion_requests", ChangeKind::Insert, id),
            &format!("{} requested deletion of {target}", user.email),
        );

        Self::get(ctx, id)
    }

    pub fn get(ctx: &AppContext, id: i64) -> AppResult<DeletionRequest> {
        deletion::get_request(ctx.conn(), id)?
            .ok_or_else(|| AppError::NotFound(format!("deletion request #{id}")))
    }

    pub fn list(
        ctx: &AppContext,
        status: Option<DeletionStatus>,
    ) -> AppResult<Vec<DeletionRequest>> {
        AuthLogic::require_user(ctx)?;
        deletion::list_requests(ctx.conn(), status)
    }

    pub fn approve(ctx: &AppContext, id: i64) -> AppResult<ReviewOutcome> {
        Self::review(ctx, id, DeletionStatus::Approved)
    }

    pub fn reject(ctx: &AppContext, id: i64) -> AppResult<ReviewOutcome> {
        Self::review(ctx, id, DeletionStatus::Rejected)
    }

    fn review(ctx: &AppContext, id: i64, next: DeletionStatus) -> AppResult<ReviewOutcome> {
        let admin = AuthLogic::require_admin(ctx)?;
        let current = Self::get(ctx, id)?;

        if !current.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition(format!(
                "deletion request #{id} is already {}",
                current.status.to_db_str()
            )));
        }

        deletion::set_status(ctx.conn(), id, next, admin.id)?;
        ctx.record(
            &ChangeEvent::new("deletion_requests", ChangeKind::Update, id),
            &format!("{} {} deletion of {}", admin.email, next.to_db_str(), current.target),
        );

        let cascade_error = match next {
            DeletionStatus::Approved => Self::apply(ctx, current.target).err(),
            _ => None,
        };

        Ok(ReviewOutcome {
            request: Self::get(ctx, id)?,
            cascade_error,
        })
    }

    fn apply(ctx: &AppContext, target: DeletionTarget) -> AppResult<()> {
        match target {
            DeletionTarget::Client(id) => ClientLogic::delete_cascade(ctx, id).map(|_| ()),
            DeletionTarget::Document(id) => DocumentLogic::delete_cascade(ctx, id).map(|_| ()),
        }
    }
}
