use crate::errors::{AppError, AppResult};
use crate::models::field::{Field, FieldType, system_fields};
use std::collections::HashSet;

/// The form/report field catalog, loaded once at startup and passed down
/// explicitly to whatever needs labels or types.
#[derive(Debug, Clone, Default)]
pub struct FieldCatalog {
    fields: Vec<Field>,
    system: Vec<Field>,
}

impl FieldCatalog {
    /// Build a catalog; ids must be unique and may not shadow the system
    /// columns (`id`, `created_at`).
    pub fn new(fields: Vec<Field>) -> AppResult<Self> {
        let system = system_fields();
        let mut seen: HashSet<&str> = system.iter().map(|f| f.id.as_str()).collect();

        for f in &fields {
            f.validate_definition()?;
            if !seen.insert(f.id.as_str()) {
                return Err(AppError::ValidationFailed(format!(
                    "duplicate field id '{}'",
                    f.id
                )));
            }
        }

        Ok(Self { fields, system })
    }

    /// User-defined form fields, in catalog order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every column a report may select: form fields, then system columns.
    pub fn reportable(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().chain(self.system.iter())
    }

    pub fn get(&self, id: &str) -> Option<&Field> {
        self.reportable().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn kind_of(&self, id: &str) -> Option<FieldType> {
        self.get(id).map(|f| f.kind)
    }

    /// Display label; unknown ids are shown as-is.
    pub fn label(&self, id: &str) -> String {
        self.get(id)
            .map(|f| f.label.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Look a column up by id, then by case-insensitive label.
    /// Used for CSV headers, which may carry either.
    pub fn resolve(&self, id_or_label: &str) -> Option<&Field> {
        let key = id_or_label.trim();
        self.get(key).or_else(|| {
            self.reportable()
                .find(|f| f.label.eq_ignore_ascii_case(key))
        })
    }
}
