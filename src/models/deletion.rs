use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Lifecycle of a deletion request: `Pending` → `Approved` | `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DeletionStatus {
    Pending,
    Approved,
    Rejected,
}

impl DeletionStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DeletionStatus::Pending => "pending",
            DeletionStatus::Approved => "approved",
            DeletionStatus::Rejected => "rejected",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(DeletionStatus::Pending),
            "approved" => Some(DeletionStatus::Approved),
            "rejected" => Some(DeletionStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeletionStatus::Pending)
    }

    /// Only `Pending` may move, and only to a terminal state.
    pub fn can_transition_to(&self, next: DeletionStatus) -> bool {
        *self == DeletionStatus::Pending && next.is_terminal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum DeletionTarget {
    Client(i64),
    Document(i64),
}

impl DeletionTarget {
    pub fn kind_str(&self) -> &'static str {
        match self {
            DeletionTarget::Client(_) => "client",
            DeletionTarget::Document(_) => "document",
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            DeletionTarget::Client(id) | DeletionTarget::Document(id) => *id,
        }
    }

    pub fn from_parts(kind: &str, id: i64) -> Option<Self> {
        match kind {
            "client" => Some(DeletionTarget::Client(id)),
            "document" => Some(DeletionTarget::Document(id)),
            _ => None,
        }
    }
}

impl fmt::Display for DeletionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.kind_str(), self.id())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletionRequest {
    pub id: i64,
    pub target: DeletionTarget,
    pub requested_by: i64,
    pub reason: String,
    pub status: DeletionStatus,
    pub reviewed_by: Option<i64>,
    pub created_at: String,
    pub reviewed_at: Option<String>,
}
