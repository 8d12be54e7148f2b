// src/report/formula.rs

use crate::errors::{AppError, AppResult};
use crate::models::client::ReportRow;
use crate::models::field::coerce_f64;
use crate::models::formula::{FormulaOp, ReportFormula};

/// Numeric value of one operand; anything non-numeric or absent counts as 0.
fn operand(row: &ReportRow, field: &str) -> f64 {
    row.get(field).and_then(coerce_f64).unwrap_or(0.0)
}

/// Evaluate `formula` against one row. Never fails: the formula was
/// validated when it was built, and degenerate inputs resolve to 0.
pub fn evaluate(row: &ReportRow, formula: &ReportFormula) -> f64 {
    let values: Vec<f64> = formula.fields.iter().map(|f| operand(row, f)).collect();
    let nth = |i: usize| values.get(i).copied().unwrap_or(0.0);

    match formula.operation {
        FormulaOp::Sum => values.iter().sum(),
        FormulaOp::Average => {
            if formula.fields.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / formula.fields.len() as f64
            }
        }
        FormulaOp::Count => values.iter().filter(|v| **v != 0.0).count() as f64,
        FormulaOp::Multiply => values.iter().product(),
        FormulaOp::Divide => {
            let divisor = nth(1);
            if divisor == 0.0 { 0.0 } else { nth(0) / divisor }
        }
        FormulaOp::Subtract => nth(0) - nth(1),
    }
}

/// Parse the CLI form `name=op:field1,field2,...`.
///
/// Example: `margin=subtract:revenue,cost`
pub fn parse_formula_arg(s: &str) -> AppResult<ReportFormula> {
    let invalid = || {
        AppError::ValidationFailed(format!(
            "formula '{s}' must look like name=operation:field1,field2"
        ))
    };

    let (name, rest) = s.split_once('=').ok_or_else(invalid)?;
    let (op, fields) = rest.split_once(':').ok_or_else(invalid)?;

    let operation = FormulaOp::from_name(op).ok_or_else(|| {
        AppError::ValidationFailed(format!(
            "unknown formula operation '{op}' (sum, average, count, multiply, divide, subtract)"
        ))
    })?;

    let fields: Vec<String> = fields
        .split(',')
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();

    ReportFormula::new(name, operation, fields)
}
