use rcrm::core::auth::AuthLogic;
use rcrm::core::clients::ClientLogic;
use rcrm::core::deletion::DeletionLogic;
use rcrm::core::documents::DocumentLogic;
use rcrm::errors::AppError;
use rcrm::models::deletion::{DeletionStatus, DeletionTarget};

mod common;
use common::{add_client, add_member, sign_in_admin, test_context};

#[test]
fn test_rejected_request_never_deletes_and_is_final() {
    let ctx = test_context("del_reject");
    sign_in_admin(&ctx);
    let client = add_client(&ctx, "Ann", "a@x.com");

    let req = DeletionLogic::request(&ctx, DeletionTarget::Client(client.id), "duplicate")
        .expect("request");
    assert_eq!(req.status, DeletionStatus::Pending);

    let outcome = DeletionLogic::reject(&ctx, req.id).expect("reject");
    assert_eq!(outcome.request.status, DeletionStatus::Rejected);
    assert!(outcome.cascade_error.is_none());
    assert!(ClientLogic::get(&ctx, client.id).is_ok());

    assert!(matches!(
        DeletionLogic::approve(&ctx, req.id),
        Err(AppError::InvalidTransition(_))
    ));
    assert!(matches!(
        DeletionLogic::reject(&ctx, req.id),
        Err(AppError::InvalidTransition(_))
    ));

    // the failed approval did not touch the target either
    assert!(ClientLogic::get(&ctx, client.id).is_ok());
    assert_eq!(
        DeletionLogic::get(&ctx, req.id).expect("get").status,
        DeletionStatus::Rejected
    );
}

#[test]
fn test_approved_client_request_cascades_to_documents() {
    let ctx = test_context("del_approve_client");
    sign_in_admin(&ctx);
    let client = add_client(&ctx, "Ann", "a@x.com");
    let doc = DocumentLogic::upload_bytes(&ctx, client.id, "contract.pdf", b"%PDF-1.7 test")
        .expect("upload");

    let req = DeletionLogic::request(&ctx, DeletionTarget::Client(client.id), "left the company")
        .expect("request");
    let outcome = DeletionLogic::approve(&ctx, req.id).expect("approve");

    assert_eq!(outcome.request.status, DeletionStatus::Approved);
    assert!(outcome.request.reviewed_by.is_some());
    assert!(outcome.cascade_error.is_none());
    assert!(matches!(ClientLogic::get(&ctx, client.id), Err(AppError::NotFound(_))));
    assert!(matches!(DocumentLogic::get(&ctx, doc.id), Err(AppError::NotFound(_))));
    assert!(!ctx.blobs.exists(&ctx.config.documents_bucket, &doc.storage_key));

    assert!(matches!(
        DeletionLogic::reject(&ctx, req.id),
        Err(AppError::InvalidTransition(_))
    ));
}

#[test]
fn test_approved_document_request_keeps_client() {
    let ctx = test_context("del_approve_doc");
    sign_in_admin(&ctx);
    let client = add_client(&ctx, "Ann", "a@x.com");
    let doc = DocumentLogic::upload_bytes(&ctx, client.id, "id.png", b"\x89PNG").expect("upload");

    let req = DeletionLogic::request(&ctx, DeletionTarget::Document(doc.id), "expired")
        .expect("request");
    DeletionLogic::approve(&ctx, req.id).expect("approve");

    assert!(matches!(DocumentLogic::get(&ctx, doc.id), Err(AppError::NotFound(_))));
    assert!(ClientLogic::get(&ctx, client.id).is_ok());
}

#[test]
fn test_cascade_failure_is_reported_and_request_stays_approved() {
    let ctx = test_context("del_cascade_fail");
    sign_in_admin(&ctx);
    let client = add_client(&ctx, "Ann", "a@x.com");
    let doc = DocumentLogic::upload_bytes(&ctx, client.id, "a.txt", b"hello").expect("upload");

    // blob vanished behind our back
    ctx.blobs
        .remove(&ctx.config.documents_bucket, &doc.storage_key)
        .expect("remove blob");

    let req = DeletionLogic::request(&ctx, DeletionTarget::Document(doc.id), "cleanup")
        .expect("request");
    let outcome = DeletionLogic::approve(&ctx, req.id).expect("approve");

    assert_eq!(outcome.request.status, DeletionStatus::Approved);
    assert!(matches!(outcome.cascade_error, Some(AppError::Upstream(_))));
}

#[test]
fn test_duplicate_pending_request_is_rejected() {
    let ctx = test_context("del_dup");
    sign_in_admin(&ctx);
    let client = add_client(&ctx, "Ann", "a@x.com");
    let target = DeletionTarget::Client(client.id);

    let first = DeletionLogic::request(&ctx, target, "first").expect("request");
    assert!(matches!(
        DeletionLogic::request(&ctx, target, "second"),
        Err(AppError::AlreadyPending(_))
    ));

    // once reviewed, a new request may be filed
    DeletionLogic::reject(&ctx, first.id).expect("reject");
    DeletionLogic::request(&ctx, target, "third").expect("new request");

    let pending = DeletionLogic::list(&ctx, Some(DeletionStatus::Pending)).expect("list");
    assert_eq!(pending.len(), 1);
    assert_eq!(DeletionLogic::list(&ctx, None).expect("list").len(), 2);
}

#[test]
fn test_request_validation() {
    let ctx = test_context("del_validation");
    sign_in_admin(&ctx);
    let client = add_client(&ctx, "Ann", "a@x.com");

    assert!(matches!(
        DeletionLogic::request(&ctx, DeletionTarget::Client(client.id), "  "),
        Err(AppError::ValidationFailed(_))
    ));
    assert!(matches!(
        DeletionLogic::request(&ctx, DeletionTarget::Client(999), "gone"),
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        DeletionLogic::request(&ctx, DeletionTarget::Document(999), "gone"),
        Err(AppError::NotFound(_))
    ));

    AuthLogic::sign_out(&ctx).expect("sign out");
    assert!(matches!(
        DeletionLogic::request(&ctx, DeletionTarget::Client(client.id), "anon"),
        Err(AppError::AuthRequired)
    ));
}

#[test]
fn test_members_request_but_only_admins_review() {
    let ctx = test_context("del_roles");
    sign_in_admin(&ctx);
    let member = add_member(&ctx, "member@example.com");
    let client = add_client(&ctx, "Ann", "a@x.com");

    AuthLogic::sign_in(&ctx, &member.email).expect("member sign in");
    let req = DeletionLogic::request(&ctx, DeletionTarget::Client(client.id), "typo")
        .expect("member request");
    assert_eq!(req.requested_by, member.id);

    assert!(matches!(
        DeletionLogic::approve(&ctx, req.id),
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        ClientLogic::delete(&ctx, client.id),
        Err(AppError::Forbidden(_))
    ));
    assert_eq!(
        DeletionLogic::get(&ctx, req.id).expect("get").status,
        DeletionStatus::Pending
    );
}
