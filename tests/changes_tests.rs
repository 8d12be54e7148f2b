use rcrm::core::clients::ClientLogic;
use rcrm::core::log::LogLogic;
use rcrm::db::changes::{ALL_TABLES, ChangeBus, ChangeEvent, ChangeKind, View, invalidated_views};
use std::cell::RefCell;
use std::rc::Rc;

mod common;
use common::{add_client, sign_in_admin, test_context, vals};

#[test]
fn test_bus_delivers_by_table_then_wildcard() {
    let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let mut bus = ChangeBus::new();

    let s = Rc::clone(&seen);
    bus.on_change("clients", move |e| s.borrow_mut().push(format!("clients:{e}")));
    let s = Rc::clone(&seen);
    bus.on_change(ALL_TABLES, move |e| s.borrow_mut().push(format!("*:{e}")));
    assert_eq!(bus.subscriber_count(), 2);

    let n = bus.publish(&ChangeEvent::new("clients", ChangeKind::Update, 7));
    assert_eq!(n, 2);
    let n = bus.publish(&ChangeEvent::new("documents", ChangeKind::Insert, 3));
    assert_eq!(n, 1);

    assert_eq!(
        *seen.borrow(),
        vec![
            "clients:clients update #7".to_string(),
            "*:clients update #7".to_string(),
            "*:documents insert #3".to_string(),
        ]
    );
}

#[test]
fn test_invalidation_policy() {
    let ev = |t: &str, k| ChangeEvent::new(t, k, 1);

    assert_eq!(
        invalidated_views(&ev("clients", ChangeKind::Insert)),
        vec![View::ClientList, View::ClientDetail, View::Dashboard]
    );
    assert_eq!(
        invalidated_views(&ev("clients", ChangeKind::Update)),
        vec![View::ClientList, View::ClientDetail]
    );
    assert!(invalidated_views(&ev("documents", ChangeKind::Delete)).contains(&View::Dashboard));
    assert!(
        invalidated_views(&ev("deletion_requests", ChangeKind::Update))
            .contains(&View::DeletionQueue)
    );
    assert_eq!(
        invalidated_views(&ev("report_templates", ChangeKind::Insert)),
        vec![View::TemplateList]
    );
    assert!(invalidated_views(&ev("log", ChangeKind::Insert)).is_empty());
}

#[test]
fn test_context_publishes_and_logs_every_change() {
    let mut ctx = test_context("changes_ctx");
    sign_in_admin(&ctx);

    let views: Rc<RefCell<Vec<View>>> = Rc::new(RefCell::new(Vec::new()));
    let v = Rc::clone(&views);
    ctx.bus.on_change("clients", move |e| {
        v.borrow_mut().extend(invalidated_views(e));
    });

    let c = add_client(&ctx, "Ann", "a@x.com");
    ClientLogic::update(&ctx, c.id, &vals(&[("company", "Acme")])).expect("update");

    assert_eq!(
        *views.borrow(),
        vec![
            View::ClientList,
            View::ClientDetail,
            View::Dashboard,
            View::ClientList,
            View::ClientDetail,
        ]
    );

    let target = format!("clients #{}", c.id);
    let ops: Vec<String> = LogLogic::entries(&ctx)
        .expect("log")
        .into_iter()
        .filter(|e| e.target == target)
        .map(|e| e.operation)
        .collect();
    assert_eq!(ops, vec!["insert".to_string(), "update".to_string()]);
}
