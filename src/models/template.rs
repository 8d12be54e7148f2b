use super::formula::ReportFormula;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Pdf,
    Excel,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Excel => "excel",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "pdf" => Some(ReportFormat::Pdf),
            "excel" => Some(ReportFormat::Excel),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Excel => "xlsx",
        }
    }
}

/// A saved (fields, formulas, format) preset.
#[derive(Debug, Clone, Serialize)]
pub struct ReportTemplate {
    pub id: i64,
    pub name: String,
    pub fields: Vec<String>,
    pub formulas: Vec<ReportFormula>,
    pub format: ReportFormat,
    pub owner: i64,
    pub created_at: String,
}
