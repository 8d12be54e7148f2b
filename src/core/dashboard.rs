use crate::core::auth::AuthLogic;
use crate::core::context::AppContext;
use crate::db::{clients, deletion, documents};
use crate::errors::{AppError, AppResult};
use crate::utils::date::last_months;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde_json::Value;

/// Label used for clients without a value in the distribution field.
pub const EMPTY_BUCKET: &str = "(empty)";

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub total_clients: i64,
    pub new_this_month: i64,
    pub documents: i64,
    pub document_bytes: i64,
    pub pending_deletions: i64,
    /// (`YYYY-MM`, clients created), oldest month first.
    pub monthly: Vec<(String, i64)>,
    pub distribution: Option<Distribution>,
}

/// Per-value client counts for one select/radio field.
#[derive(Debug, Clone, Serialize)]
pub struct Distribution {
    pub field: String,
    pub buckets: Vec<(String, i64)>,
}

pub struct DashboardLogic;

impl DashboardLogic {
    pub fn compute(
        ctx: &AppContext,
        today: NaiveDate,
        months: usize,
        distribution_field: Option<&str>,
    ) -> AppResult<Dashboard> {
        AuthLogic::require_user(ctx)?;
        let conn = ctx.conn();

        let month_start = today.with_day(1).unwrap_or(today);
        let new_this_month = clients::list_clients_created_between(
            conn,
            &month_start.format("%Y-%m-%d").to_string(),
            &today.format("%Y-%m-%d").to_string(),
        )?
        .len() as i64;

        let by_month = clients::count_clients_by_month(conn)?;
        let monthly = last_months(today, months)
            .into_iter()
            .map(|m| {
                let n = by_month.get(&m).copied().unwrap_or(0);
                (m, n)
            })
            .collect();

        let (documents, document_bytes) = documents::document_totals(conn)?;

        let distribution = match distribution_field {
            Some(id) => Some(Self::distribution(ctx, id)?),
            None => None,
        };

        Ok(Dashboard {
            total_clients: clients::count_clients(conn)?,
            new_this_month,
            documents,
            document_bytes,
            pending_deletions: deletion::count_pending(conn)?,
            monthly,
            distribution,
        })
    }

    /// Buckets follow the option order; values outside the options get
    /// their own bucket after them, then the empty bucket.
    pub fn distribution(ctx: &AppContext, field_id: &str) -> AppResult<Distribution> {
        let field = ctx
            .catalog
            .get(field_id)
            .ok_or_else(|| AppError::NotFound(format!("field '{field_id}'")))?;

        if !field.kind.has_options() {
            return Err(AppError::ValidationFailed(format!(
                "field '{field_id}' is a {} field; pick a select or radio field",
                field.kind.as_str()
            )));
        }

        let mut buckets: Vec<(String, i64)> = field
            .options
            .iter()
            .flatten()
            .map(|o| (o.clone(), 0))
            .collect();
        let mut empty = 0;

        for client in clients::list_clients(ctx.conn(), false)? {
            let label = match client.data.get(&field.id) {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                None | Some(Value::Null) | Some(Value::String(_)) => {
                    empty += 1;
                    continue;
                }
                Some(other) => other.to_string(),
            };

            match buckets.iter_mut().find(|(k, _)| *k == label) {
                Some((_, n)) => *n += 1,
                None => buckets.push((label, 1)),
            }
        }

        if empty > 0 {
            buckets.push((EMPTY_BUCKET.to_string(), empty));
        }

        Ok(Distribution {
            field: field.id.clone(),
            buckets,
        })
    }
}
