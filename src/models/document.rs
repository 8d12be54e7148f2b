use serde::Serialize;

/// Metadata row for a blob attached to a client.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: i64,
    pub client_id: i64,
    pub file_name: String,
    pub storage_key: String, // ⇔ object key inside the documents bucket
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<i64>,
    pub uploaded_at: String,
}

impl Document {
    pub fn human_size(&self) -> String {
        let b = self.size_bytes as f64;
        if b >= 1024.0 * 1024.0 {
            format!("{:.1} MB", b / (1024.0 * 1024.0))
        } else if b >= 1024.0 {
            format!("{:.1} KB", b / 1024.0)
        } else {
            format!("{} B", self.size_bytes)
        }
    }
}
