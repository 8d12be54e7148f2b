// src/report/assemble.rs

use crate::core::catalog::FieldCatalog;
use crate::models::client::ReportRow;
use crate::models::field::{FieldType, coerce_f64};
use crate::models::formula::ReportFormula;
use crate::report::formula::evaluate;
use crate::utils::formatting::{money, number};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Field(FieldType),
    /// Selected id that is not in the catalog; shown verbatim.
    Unknown,
    Formula,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub kind: ColumnKind,
}

/// Presentation settings applied after assembly.
#[derive(Debug, Clone, Default)]
pub struct DisplayOptions {
    pub currency_fields: Vec<String>,
}

impl Column {
    pub fn is_numeric(&self) -> bool {
        match self.kind {
            ColumnKind::Field(t) => t.is_numeric(),
            ColumnKind::Formula => true,
            ColumnKind::Unknown => false,
        }
    }

    /// Render one raw value of this column for display.
    pub fn display(&self, v: &Value, opts: &DisplayOptions) -> String {
        if v.is_null() {
            return String::new();
        }

        match self.kind {
            ColumnKind::Formula => coerce_f64(v).map(number).unwrap_or_default(),
            ColumnKind::Field(t)
                if t.is_numeric() && opts.currency_fields.iter().any(|c| c == &self.key) =>
            {
                coerce_f64(v)
                    .map(money)
                    .unwrap_or_else(|| t.format_value(v))
            }
            ColumnKind::Field(t) => t.format_value(v),
            ColumnKind::Unknown => FieldType::Text.format_value(v),
        }
    }
}

/// Tabular report: one entry per selected field (selection order), then one
/// per formula. Rows keep the order they were given in.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Value>>,
}

impl ReportTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.key.as_str()).collect()
    }

    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    pub fn value(&self, row: usize, key: &str) -> Option<&Value> {
        let col = self.column_index(key)?;
        self.rows.get(row)?.get(col)
    }

    pub fn display_rows(&self, opts: &DisplayOptions) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(col, v)| col.display(v, opts))
                    .collect()
            })
            .collect()
    }
}

pub fn assemble(
    rows: &[ReportRow],
    selected: &[String],
    formulas: &[ReportFormula],
    catalog: &FieldCatalog,
) -> ReportTable {
    let mut columns: Vec<Column> = selected
        .iter()
        .map(|id| Column {
            key: id.clone(),
            label: catalog.label(id),
            kind: catalog
                .kind_of(id)
                .map(ColumnKind::Field)
                .unwrap_or(ColumnKind::Unknown),
        })
        .collect();

    columns.extend(formulas.iter().map(|f| Column {
        key: f.name.clone(),
        label: f.name.clone(),
        kind: ColumnKind::Formula,
    }));

    let table_rows = rows
        .iter()
        .map(|row| {
            let mut out: Vec<Value> = selected
                .iter()
                .map(|id| row.get(id).cloned().unwrap_or(Value::Null))
                .collect();
            out.extend(formulas.iter().map(|f| Value::from(evaluate(row, f))));
            out
        })
        .collect();

    ReportTable {
        columns,
        rows: table_rows,
    }
}
