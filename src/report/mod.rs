//! Report pipeline: date-range filter, formula evaluation, table assembly
//! and PDF / Excel encoding.

pub mod assemble;
pub mod encode;
pub mod excel_date;
pub mod formula;
pub mod logic;
pub mod pdf;
pub mod range;
pub mod xlsx;

pub use assemble::{Column, ColumnKind, DisplayOptions, ReportTable, assemble};
pub use encode::{Artifact, encode, report_filename, write_artifact};
pub use formula::{evaluate, parse_formula_arg};
pub use logic::{ReportLogic, ReportSelection};
pub use range::{DateRange, filter_rows, parse_range};
