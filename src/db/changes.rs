//! Change notification: table-scoped pub/sub plus the invalidation policy
//! that decides which views must be refetched after a change.

use std::collections::HashMap;
use std::fmt;

/// Subscribe to this table name to receive every event.
pub const ALL_TABLES: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
    pub record_id: String,
}

impl ChangeEvent {
    pub fn new(table: &str, kind: ChangeKind, record_id: impl ToString) -> Self {
        Self {
            table: table.to_string(),
            kind,
            record_id: record_id.to_string(),
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} #{}", self.table, self.kind.as_str(), self.record_id)
    }
}

/// Cached views of the application that depend on stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum View {
    ClientList,
    ClientDetail,
    Dashboard,
    DocumentList,
    DeletionQueue,
    TemplateList,
    FieldCatalog,
    UserList,
    Session,
}

/// Invalidation policy: which views are stale after `event`.
pub fn invalidated_views(event: &ChangeEvent) -> Vec<View> {
    match event.table.as_str() {
        "clients" => match event.kind {
            ChangeKind::Update => vec![View::ClientList, View::ClientDetail],
            _ => vec![View::ClientList, View::ClientDetail, View::Dashboard],
        },
        "documents" => vec![View::DocumentList, View::ClientDetail, View::Dashboard],
        "deletion_requests" => vec![View::DeletionQueue, View::Dashboard],
        "report_templates" => vec![View::TemplateList],
        "fields" => vec![View::FieldCatalog, View::ClientDetail],
        "users" => vec![View::UserList],
        "session" => vec![View::Session],
        _ => Vec::new(),
    }
}

type Callback = Box<dyn Fn(&ChangeEvent)>;

/// In-process pub/sub keyed by table name.
#[derive(Default)]
pub struct ChangeBus {
    subscribers: HashMap<String, Vec<Callback>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` for changes on `table` (or [`ALL_TABLES`]).
    pub fn on_change<F>(&mut self, table: &str, callback: F)
    where
        F: Fn(&ChangeEvent) + 'static,
    {
        self.subscribers
            .entry(table.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Deliver `event` to table subscribers first, then wildcard ones.
    /// Returns the number of callbacks invoked.
    pub fn publish(&self, event: &ChangeEvent) -> usize {
        let mut delivered = 0;

        for key in [event.table.as_str(), ALL_TABLES] {
            if let Some(list) = self.subscribers.get(key) {
                for cb in list {
                    cb(event);
                    delivered += 1;
                }
            }
        }

        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.values().map(Vec::len).sum()
    }
}
