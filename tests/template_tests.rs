use rcrm::core::auth::AuthLogic;
use rcrm::core::templates::TemplateLogic;
use rcrm::errors::AppError;
use rcrm::models::formula::{FormulaOp, ReportFormula};
use rcrm::models::template::ReportFormat;
use rcrm::report::logic::ReportSelection;

mod common;
use common::{add_member, sign_in_admin, test_context};

fn sample_selection() -> ReportSelection {
    ReportSelection::new(
        vec!["name".into(), "revenue".into(), "rating".into()],
        vec![
            ReportFormula::new(
                "per_star",
                FormulaOp::Divide,
                vec!["revenue".into(), "rating".into()],
            )
            .expect("formula"),
            ReportFormula::new("total", FormulaOp::Sum, vec!["revenue".into(), "rating".into()])
                .expect("formula"),
        ],
        ReportFormat::Pdf,
    )
}

#[test]
fn test_save_then_load_round_trip() {
    let ctx = test_context("tpl_round_trip");
    let admin = sign_in_admin(&ctx);
    let sel = sample_selection();

    let id = TemplateLogic::save(&ctx, "Quarterly", &sel).expect("save");
    let t = TemplateLogic::load(&ctx, id).expect("load");

    assert_eq!(t.name, "Quarterly");
    assert_eq!(t.owner, admin.id);
    assert_eq!(t.fields, sel.fields);
    assert_eq!(t.formulas, sel.formulas);
    assert_eq!(t.format, sel.format);
}

#[test]
fn test_save_requires_identity_and_name() {
    let ctx = test_context("tpl_guard");
    sign_in_admin(&ctx);

    assert!(matches!(
        TemplateLogic::save(&ctx, "   ", &sample_selection()),
        Err(AppError::ValidationFailed(_))
    ));

    let clash = ReportSelection::new(
        vec!["total".into()],
        vec![ReportFormula::new("total", FormulaOp::Count, vec!["rating".into()]).expect("formula")],
        ReportFormat::Excel,
    );
    assert!(matches!(
        TemplateLogic::save(&ctx, "Clash", &clash),
        Err(AppError::ValidationFailed(_))
    ));

    AuthLogic::sign_out(&ctx).expect("sign out");
    assert!(matches!(
        TemplateLogic::save(&ctx, "Anon", &sample_selection()),
        Err(AppError::AuthRequired)
    ));
}

#[test]
fn test_load_unknown_template_is_not_found() {
    let ctx = test_context("tpl_missing");
    assert!(matches!(
        TemplateLogic::load(&ctx, 42),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_apply_template_replaces_selection_in_full() {
    let ctx = test_context("tpl_apply");
    sign_in_admin(&ctx);
    let id = TemplateLogic::save(&ctx, "Quarterly", &sample_selection()).expect("save");
    let t = TemplateLogic::load(&ctx, id).expect("load");

    let mut current = ReportSelection::new(
        vec!["email".into(), "phone".into(), "company".into(), "status".into()],
        vec![],
        ReportFormat::Excel,
    );
    current.apply_template(&t);

    assert_eq!(current, ReportSelection::from_template(&t));
    assert!(!current.fields.contains(&"email".to_string()));
    assert_eq!(current.format, ReportFormat::Pdf);
}

#[test]
fn test_list_is_shared_and_delete_is_owner_or_admin() {
    let ctx = test_context("tpl_delete");
    sign_in_admin(&ctx);
    let member = add_member(&ctx, "member@example.com");
    let admin_tpl = TemplateLogic::save(&ctx, "Admin view", &sample_selection()).expect("save");

    AuthLogic::sign_in(&ctx, &member.email).expect("member sign in");
    let own_tpl = TemplateLogic::save(&ctx, "Mine", &sample_selection()).expect("save");

    let names: Vec<String> = TemplateLogic::list(&ctx)
        .expect("list")
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert!(names.contains(&"Admin view".to_string()));
    assert!(names.contains(&"Mine".to_string()));

    assert!(matches!(
        TemplateLogic::delete(&ctx, admin_tpl),
        Err(AppError::Forbidden(_))
    ));
    TemplateLogic::delete(&ctx, own_tpl).expect("owner delete");

    AuthLogic::sign_in(&ctx, "admin@example.com").expect("admin sign in");
    TemplateLogic::delete(&ctx, admin_tpl).expect("admin delete");
    assert!(TemplateLogic::list(&ctx).expect("list").is_empty());
}
