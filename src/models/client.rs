use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// One report row: field id → scalar value.
pub type ReportRow = BTreeMap<String, Value>;

/// A client record. Form values live in `data`, keyed by field id.
#[derive(Debug, Clone, Serialize)]
pub struct Client {
    pub id: i64,
    pub data: BTreeMap<String, Value>, // ⇔ clients.data (JSON object)
    pub created_by: Option<i64>,
    pub created_at: String, // ISO timestamp
    pub updated_at: String, // ISO timestamp
}

impl Client {
    /// Display name used in listings and messages.
    pub fn display_name(&self) -> String {
        match self.data.get("name").and_then(Value::as_str) {
            Some(n) if !n.trim().is_empty() => n.to_string(),
            _ => format!("client #{}", self.id),
        }
    }

    /// Flatten into a report row, including the system columns.
    pub fn to_report_row(&self) -> ReportRow {
        let mut row = self.data.clone();
        row.insert("id".to_string(), Value::from(self.id));
        row.insert(
            "created_at".to_string(),
            Value::String(self.created_at.clone()),
        );
        row
    }
}
