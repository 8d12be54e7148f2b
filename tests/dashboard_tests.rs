use chrono::NaiveDate;
use rcrm::core::auth::AuthLogic;
use rcrm::core::clients::ClientLogic;
use rcrm::core::dashboard::{DashboardLogic, EMPTY_BUCKET};
use rcrm::core::deletion::DeletionLogic;
use rcrm::core::documents::DocumentLogic;
use rcrm::errors::AppError;
use rcrm::models::deletion::DeletionTarget;

mod common;
use common::{add_client, set_created_at, sign_in_admin, test_context, vals};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 20).expect("valid date")
}

#[test]
fn test_dashboard_counts_and_monthly_series() {
    let ctx = test_context("dash_counts");
    sign_in_admin(&ctx);

    let a = add_client(&ctx, "Ann", "a@x.com");
    let b = add_client(&ctx, "Bo", "b@x.com");
    let c = add_client(&ctx, "Cy", "c@x.com");
    let d = add_client(&ctx, "Di", "d@x.com");
    set_created_at(&ctx, a.id, "2025-01-15T10:00:00+01:00");
    set_created_at(&ctx, b.id, "2025-03-01T08:00:00+01:00");
    set_created_at(&ctx, c.id, "2025-03-20T18:00:00+01:00");
    set_created_at(&ctx, d.id, "2024-11-30T12:00:00+01:00");

    DocumentLogic::upload_bytes(&ctx, a.id, "a.txt", &[0u8; 2048]).expect("upload");
    DeletionLogic::request(&ctx, DeletionTarget::Client(d.id), "old").expect("request");

    let dash = DashboardLogic::compute(&ctx, today(), 3, None).expect("dashboard");

    assert_eq!(dash.total_clients, 4);
    assert_eq!(dash.new_this_month, 2);
    assert_eq!(dash.documents, 1);
    assert_eq!(dash.document_bytes, 2048);
    assert_eq!(dash.pending_deletions, 1);
    assert_eq!(
        dash.monthly,
        vec![
            ("2025-01".to_string(), 1),
            ("2025-02".to_string(), 0),
            ("2025-03".to_string(), 2),
        ]
    );
    assert!(dash.distribution.is_none());
}

#[test]
fn test_monthly_series_crosses_year_boundary() {
    let ctx = test_context("dash_year");
    sign_in_admin(&ctx);
    let a = add_client(&ctx, "Ann", "a@x.com");
    set_created_at(&ctx, a.id, "2024-12-31T23:00:00+00:00");

    let dash = DashboardLogic::compute(&ctx, NaiveDate::from_ymd_opt(2025, 1, 5).expect("date"), 2, None)
        .expect("dashboard");
    assert_eq!(
        dash.monthly,
        vec![("2024-12".to_string(), 1), ("2025-01".to_string(), 0)]
    );
}

#[test]
fn test_distribution_follows_option_order() {
    let ctx = test_context("dash_distribution");
    sign_in_admin(&ctx);

    for (name, status) in [("Ann", "Active"), ("Bo", "Lead"), ("Cy", "Active"), ("Di", "")] {
        let email = format!("{}@x.com", name.to_lowercase());
        ClientLogic::create(
            &ctx,
            &vals(&[("name", name), ("email", email.as_str()), ("status", status)]),
        )
        .expect("create");
    }

    let dash = DashboardLogic::compute(&ctx, today(), 1, Some("status")).expect("dashboard");
    let dist = dash.distribution.expect("distribution");

    assert_eq!(dist.field, "status");
    assert_eq!(
        dist.buckets,
        vec![
            ("Lead".to_string(), 1),
            ("Active".to_string(), 2),
            ("Inactive".to_string(), 0),
            (EMPTY_BUCKET.to_string(), 1),
        ]
    );
}

#[test]
fn test_distribution_needs_a_choice_field() {
    let ctx = test_context("dash_distribution_bad");
    sign_in_admin(&ctx);

    assert!(matches!(
        DashboardLogic::distribution(&ctx, "revenue"),
        Err(AppError::ValidationFailed(_))
    ));
    assert!(matches!(
        DashboardLogic::distribution(&ctx, "shoe_size"),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_dashboard_requires_sign_in() {
    let ctx = test_context("dash_auth");
    sign_in_admin(&ctx);
    AuthLogic::sign_out(&ctx).expect("sign out");

    assert!(matches!(
        DashboardLogic::compute(&ctx, today(), 6, None),
        Err(AppError::AuthRequired)
    ));
}
