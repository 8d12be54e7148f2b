pub mod client;
pub mod deletion;
pub mod document;
pub mod field;
pub mod formula;
pub mod template;
pub mod user;

pub use client::{Client, ReportRow};
pub use deletion::{DeletionRequest, DeletionStatus, DeletionTarget};
pub use document::Document;
pub use field::{Field, FieldType};
pub use formula::{FormulaOp, ReportFormula};
pub use template::{ReportFormat, ReportTemplate};
pub use user::{Role, User};
