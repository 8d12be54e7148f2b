use crate::errors::{AppError, AppResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FormulaOp {
    Sum,
    Average,
    Count,
    Multiply,
    Divide,
    Subtract,
}

impl FormulaOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaOp::Sum => "sum",
            FormulaOp::Average => "average",
            FormulaOp::Count => "count",
            FormulaOp::Multiply => "multiply",
            FormulaOp::Divide => "divide",
            FormulaOp::Subtract => "subtract",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Some(FormulaOp::Sum),
            "average" | "avg" => Some(FormulaOp::Average),
            "count" => Some(FormulaOp::Count),
            "multiply" | "mul" => Some(FormulaOp::Multiply),
            "divide" | "div" => Some(FormulaOp::Divide),
            "subtract" | "sub" => Some(FormulaOp::Subtract),
            _ => None,
        }
    }

    /// Binary operations take exactly two operands.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            FormulaOp::Multiply | FormulaOp::Divide | FormulaOp::Subtract
        )
    }

    fn expression(&self, fields: &[String]) -> String {
        match self {
            FormulaOp::Multiply => fields.join(" * "),
            FormulaOp::Divide => fields.join(" / "),
            FormulaOp::Subtract => fields.join(" - "),
            FormulaOp::Sum => format!("SUM({})", fields.join(", ")),
            FormulaOp::Average => format!("AVERAGE({})", fields.join(", ")),
            FormulaOp::Count => format!("COUNT({})", fields.join(", ")),
        }
    }
}

impl fmt::Display for FormulaOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named derived column. Instances are always well-formed: both the
/// constructor and deserialization go through [`ReportFormula::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FormulaRecord")]
pub struct ReportFormula {
    pub name: String,
    pub operation: FormulaOp,
    pub fields: Vec<String>,
    pub expression: String,
}

#[derive(Deserialize)]
struct FormulaRecord {
    name: String,
    operation: FormulaOp,
    fields: Vec<String>,
    #[serde(default)]
    expression: Option<String>,
}

impl TryFrom<FormulaRecord> for ReportFormula {
    type Error = AppError;

    fn try_from(r: FormulaRecord) -> AppResult<Self> {
        let mut f = ReportFormula::new(&r.name, r.operation, r.fields)?;
        if let Some(expr) = r.expression.filter(|e| !e.trim().is_empty()) {
            f.expression = expr;
        }
        Ok(f)
    }
}

impl ReportFormula {
    pub fn new(name: &str, operation: FormulaOp, fields: Vec<String>) -> AppResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationFailed(
                "formula name cannot be empty".into(),
            ));
        }

        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(AppError::ValidationFailed(format!(
                "formula '{name}' has an empty operand"
            )));
        }

        if operation.is_binary() && fields.len() != 2 {
            return Err(AppError::ValidationFailed(format!(
                "formula '{name}': {operation} needs exactly 2 fields, got {}",
                fields.len()
            )));
        }

        if fields.is_empty() {
            return Err(AppError::ValidationFailed(format!(
                "formula '{name}': {operation} needs at least 1 field"
            )));
        }

        let expression = operation.expression(&fields);
        Ok(Self {
            name: name.to_string(),
            operation,
            fields,
            expression,
        })
    }
}
