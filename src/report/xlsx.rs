// src/report/xlsx.rs

use crate::errors::{AppError, AppResult};
use crate::models::field::{Field, FieldType, coerce_f64};
use crate::report::assemble::{Column, ColumnKind, DisplayOptions, ReportTable};
use crate::report::excel_date::{
    DATE_FORMAT, TIME_FORMAT, parse_to_excel_date, parse_to_excel_time,
};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use serde_json::Value;
use unicode_width::UnicodeWidthStr;

const HEADER_BG: u32 = 0x2F75B5;
const REQUIRED_BG: u32 = 0xFFC000;
const BAND_1: u32 = 0xEAF3FB;
const BAND_2: u32 = 0xFFFFFF;
const MAX_WIDTH: usize = 60;

fn header_format(bg: u32, font: u32) -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::RGB(font))
        .set_background_color(Color::RGB(bg))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin)
}

fn cell_format(bg: u32) -> Format {
    Format::new()
        .set_background_color(Color::RGB(bg))
        .set_pattern(FormatPattern::Solid)
        .set_border(FormatBorder::Thin)
}

/// Workbook with one sheet: header row of labels, one row per table row.
pub(crate) fn encode_xlsx(table: &ReportTable, opts: &DisplayOptions) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Report").map_err(to_app_error)?;

    // ---------------------------
    // Header
    // ---------------------------
    let header = header_format(HEADER_BG, 0xFFFFFF);
    for (col, label) in table.headers().iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *label, &header)
            .map_err(to_app_error)?;
    }
    worksheet.set_freeze_panes(1, 0).map_err(to_app_error)?;

    let mut col_widths: Vec<usize> = table
        .headers()
        .iter()
        .map(|h| UnicodeWidthStr::width(*h))
        .collect();

    // ---------------------------
    // Rows
    // ---------------------------
    if table.is_empty() {
        worksheet
            .write(1, 0, "No data available")
            .map_err(to_app_error)?;
    }

    for (row_index, values) in table.rows.iter().enumerate() {
        let row = (row_index + 1) as u32;
        let band = if row_index % 2 == 0 { BAND_1 } else { BAND_2 };

        for (col, (column, value)) in table.columns.iter().zip(values).enumerate() {
            let shown = column.display(value, opts);
            write_cell(worksheet, row, col as u16, column, value, &shown, band, opts)?;
            col_widths[col] = col_widths[col].max(UnicodeWidthStr::width(shown.as_str()));
        }
    }

    for (c, w) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(c as u16, (*w).min(MAX_WIDTH) as f64 + 2.0)
            .map_err(to_app_error)?;
    }

    workbook.save_to_buffer().map_err(to_app_error)
}

/// Header-only workbook to be filled in and imported back as clients.
/// Required fields are highlighted.
pub(crate) fn encode_import_template(fields: &[Field]) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Import").map_err(to_app_error)?;

    let normal = header_format(HEADER_BG, 0xFFFFFF);
    let required = header_format(REQUIRED_BG, 0x000000);

    for (col, f) in fields.iter().enumerate() {
        let fmt = if f.required { &required } else { &normal };
        worksheet
            .write_with_format(0, col as u16, f.id.as_str(), fmt)
            .map_err(to_app_error)?;

        let width = UnicodeWidthStr::width(f.id.as_str()).max(12);
        worksheet
            .set_column_width(col as u16, width as f64 + 2.0)
            .map_err(to_app_error)?;
    }

    worksheet.set_freeze_panes(1, 0).map_err(to_app_error)?;
    workbook.save_to_buffer().map_err(to_app_error)
}

/// Write one cell using the column type: dates and times as Excel serials,
/// numbers as numbers, everything else as its display text.
#[allow(clippy::too_many_arguments)]
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    column: &Column,
    value: &Value,
    shown: &str,
    band: u32,
    opts: &DisplayOptions,
) -> AppResult<()> {
    if value.is_null() {
        worksheet
            .write_blank(row, col, &cell_format(band))
            .map_err(to_app_error)?;
        return Ok(());
    }

    let raw = value.as_str().unwrap_or_default();

    let typed: Option<(f64, Format)> = match column.kind {
        ColumnKind::Field(FieldType::Date) => parse_to_excel_date(raw)
            .map(|serial| (serial, cell_format(band).set_num_format(DATE_FORMAT))),
        ColumnKind::Field(FieldType::Time) => parse_to_excel_time(raw)
            .map(|serial| (serial, cell_format(band).set_num_format(TIME_FORMAT))),
        _ if column.is_numeric() => coerce_f64(value).map(|n| {
            let mut fmt = cell_format(band).set_align(FormatAlign::Right);
            if opts.currency_fields.iter().any(|c| c == &column.key) {
                fmt = fmt.set_num_format("#,##0.00");
            }
            (n, fmt)
        }),
        _ => None,
    };

    match typed {
        Some((n, fmt)) => {
            worksheet
                .write_with_format(row, col, n, &fmt)
                .map_err(to_app_error)?;
        }
        None => {
            worksheet
                .write_with_format(row, col, shown, &cell_format(band))
                .map_err(to_app_error)?;
        }
    }

    Ok(())
}

fn to_app_error<E: std::fmt::Display>(e: E) -> AppError {
    AppError::Export(format!("XLSX: {e}"))
}
