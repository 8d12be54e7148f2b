use rcrm::core::auth::AuthLogic;
use rcrm::core::clients::{ClientLogic, parse_assignment};
use rcrm::core::fields::FieldLogic;
use rcrm::core::users::UserLogic;
use rcrm::errors::AppError;
use rcrm::models::field::{Field, FieldType};
use rcrm::models::user::Role;
use serde_json::json;
use std::fs;

mod common;
use common::{add_client, add_member, sign_in_admin, temp_out, test_context, vals};

#[test]
fn test_create_validates_and_normalizes_values() {
    let ctx = test_context("client_create");
    sign_in_admin(&ctx);

    let c = ClientLogic::create(
        &ctx,
        &vals(&[
            ("name", "Ann Smith"),
            ("Email", "Ann@Example.com"),
            ("revenue", "1200,50"),
            ("rating", "4"),
            ("status", "Active"),
            ("newsletter", "yes"),
            ("phone", ""),
        ]),
    )
    .expect("create");

    assert_eq!(c.display_name(), "Ann Smith");
    assert_eq!(c.data.get("email"), Some(&json!("ann@example.com")));
    assert_eq!(c.data.get("revenue"), Some(&json!(1200.5)));
    assert_eq!(c.data.get("rating"), Some(&json!(4)));
    assert_eq!(c.data.get("newsletter"), Some(&json!(true)));
    assert!(!c.data.contains_key("phone"));
    assert!(c.created_by.is_some());
}

#[test]
fn test_number_input_accepts_grouping_separators() {
    let revenue = Field::new("revenue", "Revenue", FieldType::Number);

    for (raw, expected) in [
        ("1,234.50", 1234.5),
        ("1.234,50", 1234.5),
        ("1200,50", 1200.5),
        ("1,234,567", 1234567.0),
        (" 42 ", 42.0),
    ] {
        assert_eq!(
            revenue.parse_value(raw).expect(raw),
            json!(expected),
            "{raw}"
        );
    }
    assert!(revenue.parse_value("1.234.50,1,2").is_err());
}

#[test]
fn test_create_rejects_bad_input() {
    let ctx = test_context("client_bad_input");
    sign_in_admin(&ctx);

    let cases: Vec<Vec<(String, String)>> = vec![
        vals(&[("name", "Ann")]),
        vals(&[("name", "Ann"), ("email", "not-an-email")]),
        vals(&[("name", "Ann"), ("email", "a@x.com"), ("rating", "9")]),
        vals(&[("name", "Ann"), ("email", "a@x.com"), ("status", "Prospect")]),
        vals(&[("name", "Ann"), ("email", "a@x.com"), ("birth_date", "31/12/1990")]),
        vals(&[("name", "Ann"), ("email", "a@x.com"), ("nickname", "Annie")]),
        vals(&[("name", "Ann"), ("email", "a@x.com"), ("created_at", "2020-01-01")]),
    ];

    for values in cases {
        assert!(
            matches!(
                ClientLogic::create(&ctx, &values),
                Err(AppError::ValidationFailed(_))
            ),
            "{values:?} should be rejected"
        );
    }
    assert!(ClientLogic::list(&ctx, false).expect("list").is_empty());
}

#[test]
fn test_update_merges_and_clears_values() {
    let ctx = test_context("client_update");
    sign_in_admin(&ctx);
    let c = ClientLogic::create(
        &ctx,
        &vals(&[("name", "Ann"), ("email", "a@x.com"), ("company", "Acme")]),
    )
    .expect("create");

    let updated = ClientLogic::update(&ctx, c.id, &vals(&[("company", ""), ("phone", "+39 02 1234567")]))
        .expect("update");
    assert_eq!(updated.data.get("name"), Some(&json!("Ann")));
    assert!(!updated.data.contains_key("company"));
    assert_eq!(updated.data.get("phone"), Some(&json!("+39 02 1234567")));

    assert!(matches!(
        ClientLogic::update(&ctx, c.id, &vals(&[("email", "")])),
        Err(AppError::ValidationFailed(_))
    ));
    assert!(matches!(
        ClientLogic::update(&ctx, 999, &vals(&[("company", "X")])),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_client_operations_require_sign_in() {
    let ctx = test_context("client_auth");
    sign_in_admin(&ctx);
    AuthLogic::sign_out(&ctx).expect("sign out");

    assert!(matches!(
        ClientLogic::create(&ctx, &vals(&[("name", "Ann"), ("email", "a@x.com")])),
        Err(AppError::AuthRequired)
    ));
    assert!(matches!(ClientLogic::list(&ctx, true), Err(AppError::AuthRequired)));
}

#[test]
fn test_list_order() {
    let ctx = test_context("client_order");
    sign_in_admin(&ctx);
    let a = add_client(&ctx, "Ann", "a@x.com");
    let b = add_client(&ctx, "Bo", "b@x.com");

    let oldest: Vec<i64> = ClientLogic::list(&ctx, false).expect("list").iter().map(|c| c.id).collect();
    let newest: Vec<i64> = ClientLogic::list(&ctx, true).expect("list").iter().map(|c| c.id).collect();
    assert_eq!(oldest, vec![a.id, b.id]);
    assert_eq!(newest, vec![b.id, a.id]);
}

#[test]
fn test_parse_assignment() {
    assert_eq!(
        parse_assignment("notes=a=b").expect("parse"),
        ("notes".to_string(), "a=b".to_string())
    );
    assert!(parse_assignment("novalue").is_err());
    assert!(parse_assignment("=x").is_err());
}

#[test]
fn test_csv_import_by_id_or_label() {
    let ctx = test_context("client_csv_ok");
    sign_in_admin(&ctx);
    let path = temp_out("client_csv_ok", "csv");
    fs::write(
        &path,
        "Name,email,Status,revenue\nAnn,a@x.com,Lead,100\nBo,b@x.com,,250.5\n",
    )
    .expect("write csv");

    let ids = ClientLogic::import_csv(&ctx, std::path::Path::new(&path)).expect("import");
    assert_eq!(ids.len(), 2);

    let bo = ClientLogic::get(&ctx, ids[1]).expect("get");
    assert_eq!(bo.data.get("revenue"), Some(&json!(250.5)));
    assert!(!bo.data.contains_key("status"));
}

#[test]
fn test_csv_import_is_all_or_nothing() {
    let ctx = test_context("client_csv_bad");
    sign_in_admin(&ctx);
    let path = temp_out("client_csv_bad", "csv");
    fs::write(
        &path,
        "name,email\nAnn,a@x.com\nBo,not-an-email\nCy,c@x.com\n",
    )
    .expect("write csv");

    match ClientLogic::import_csv(&ctx, std::path::Path::new(&path)) {
        Err(AppError::ValidationFailed(msg)) => assert!(msg.contains("CSV line 3"), "{msg}"),
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert!(ClientLogic::list(&ctx, false).expect("list").is_empty());

    let header_only = temp_out("client_csv_empty", "csv");
    fs::write(&header_only, "name,email\n").expect("write csv");
    assert!(ClientLogic::import_csv(&ctx, std::path::Path::new(&header_only)).is_err());

    let unknown = temp_out("client_csv_unknown", "csv");
    fs::write(&unknown, "name,email,shoe_size\nAnn,a@x.com,42\n").expect("write csv");
    assert!(matches!(
        ClientLogic::import_csv(&ctx, std::path::Path::new(&unknown)),
        Err(AppError::ValidationFailed(_))
    ));
}

#[test]
fn test_field_catalog_management() {
    let mut ctx = test_context("client_fields");
    sign_in_admin(&ctx);

    FieldLogic::add(
        &mut ctx,
        Field::new("tier", "Tier", FieldType::Select).with_options(&["Gold", "Silver"]),
    )
    .expect("add field");
    assert!(ctx.catalog.contains("tier"));

    // duplicates, system ids and option-less selects are refused
    for bad in [
        Field::new("tier", "Tier again", FieldType::Text),
        Field::new("created_at", "Created", FieldType::Date),
        Field::new("level", "Level", FieldType::Radio),
        Field::new("Bad Id", "Bad", FieldType::Text),
    ] {
        assert!(matches!(
            FieldLogic::add(&mut ctx, bad),
            Err(AppError::ValidationFailed(_))
        ));
    }

    let c = ClientLogic::create(
        &ctx,
        &vals(&[("name", "Ann"), ("email", "a@x.com"), ("tier", "Gold")]),
    )
    .expect("create with new field");

    assert!(matches!(
        FieldLogic::remove(&mut ctx, "tier"),
        Err(AppError::ValidationFailed(_))
    ));
    ClientLogic::update(&ctx, c.id, &vals(&[("tier", "")])).expect("clear tier");
    FieldLogic::remove(&mut ctx, "tier").expect("remove field");
    assert!(!ctx.catalog.contains("tier"));

    assert!(matches!(
        FieldLogic::remove(&mut ctx, "tier"),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn test_users_and_roles() {
    let ctx = test_context("client_users");

    // the very first user bootstraps as admin without a session
    let first = UserLogic::create(&ctx, "boss@example.com", "Boss", Role::User).expect("bootstrap");
    assert_eq!(first.role, Role::Admin);

    assert!(matches!(
        UserLogic::create(&ctx, "x@example.com", "X", Role::User),
        Err(AppError::AuthRequired)
    ));

    AuthLogic::sign_in(&ctx, &first.email).expect("sign in");
    let member = add_member(&ctx, "member@example.com");
    assert_eq!(member.role, Role::User);

    assert!(matches!(
        UserLogic::create(&ctx, "member@example.com", "Dup", Role::User),
        Err(AppError::ValidationFailed(_))
    ));
    assert!(matches!(
        UserLogic::delete(&ctx, first.id),
        Err(AppError::ValidationFailed(_))
    ));
    assert!(matches!(
        AuthLogic::sign_in(&ctx, "nobody@example.com"),
        Err(AppError::NotFound(_))
    ));

    UserLogic::delete(&ctx, member.id).expect("delete member");
    assert_eq!(UserLogic::list(&ctx).expect("list").len(), 1);
}
