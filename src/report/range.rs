// src/report/range.rs

use crate::errors::{AppError, AppResult};
use crate::models::client::ReportRow;
use crate::models::field::parse_calendar_day;
use crate::ui::messages::warning;
use crate::utils::date::{end_of_day, month_last_day, start_of_day};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Attribute every report row carries its creation instant under.
pub const TIMESTAMP_KEY: &str = "created_at";

/// Inclusive calendar window. A missing `from` disables filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> AppResult<Self> {
        if let (Some(f), Some(t)) = (from, to)
            && f > t
        {
            return Err(AppError::InvalidDate(format!(
                "range start {f} is after range end {t}"
            )));
        }
        Ok(Self { from, to })
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> AppResult<Self> {
        Self::new(Some(from), Some(to))
    }

    /// Does the instant `t` fall inside the window?
    pub fn contains(&self, t: NaiveDateTime) -> bool {
        let Some(from) = self.from else {
            return true;
        };
        if t < start_of_day(from) {
            return false;
        }
        match self.to {
            Some(to) => t <= end_of_day(to),
            None => true,
        }
    }

    /// Human label, e.g. "from 2025-01-01 to 2025-03-31".
    pub fn describe(&self) -> String {
        match (self.from, self.to) {
            (None, _) => "all dates".to_string(),
            (Some(f), None) => format!("since {f}"),
            (Some(f), Some(t)) if f == t => format!("on {f}"),
            (Some(f), Some(t)) => format!("from {f} to {t}"),
        }
    }
}

/// Keep rows whose timestamp lies inside `range`.
///
/// No range (or no start bound) returns the rows unchanged. Rows whose
/// timestamp is missing or unparseable are dropped and reported.
pub fn filter_rows(rows: Vec<ReportRow>, range: Option<&DateRange>) -> Vec<ReportRow> {
    filter_rows_by(rows, range, TIMESTAMP_KEY)
}

pub fn filter_rows_by(rows: Vec<ReportRow>, range: Option<&DateRange>, key: &str) -> Vec<ReportRow> {
    let range = match range {
        Some(r) if r.from.is_some() => r,
        _ => return rows,
    };

    let mut skipped = 0usize;
    let kept: Vec<ReportRow> = rows
        .into_iter()
        .filter(|row| match row.get(key).and_then(parse_instant) {
            Some(t) => range.contains(t),
            None => {
                skipped += 1;
                false
            }
        })
        .collect();

    if skipped > 0 {
        warning(format!(
            "{skipped} row(s) excluded: missing or unparseable '{key}'"
        ));
    }

    kept
}

/// Parse a stored timestamp into a wall-clock instant.
pub fn parse_instant(v: &Value) -> Option<NaiveDateTime> {
    let s = v.as_str()?.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    parse_calendar_day(s).map(start_of_day)
}

/// Parse a `--range` expression.
///
/// Supports:
/// - YYYY
/// - YYYY-MM
/// - YYYY-MM-DD
/// - any of the above as `start:end` (same or mixed granularity)
/// - `start:` for an open-ended window
pub fn parse_range(r: &str) -> AppResult<DateRange> {
    let r = r.trim();

    if let Some((start_raw, end_raw)) = r.split_once(':') {
        let start = start_raw.trim();
        let end = end_raw.trim();

        if start.is_empty() {
            return Err(AppError::InvalidDate(format!(
                "range '{r}' needs a start date"
            )));
        }

        let (from, _) = period_bounds(start)?;
        if end.is_empty() {
            return DateRange::new(Some(from), None);
        }

        let (_, to) = period_bounds(end)?;
        DateRange::between(from, to)
    } else {
        let (from, to) = period_bounds(r)?;
        DateRange::between(from, to)
    }
}

/// First and last day covered by a YYYY / YYYY-MM / YYYY-MM-DD period.
fn period_bounds(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::InvalidDate(p.to_string());

    match p.len() {
        // YYYY
        4 => {
            let y: i32 = p.parse().map_err(|_| invalid())?;
            let d1 = NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(invalid)?;
            let d2 = NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(invalid)?;
            Ok((d1, d2))
        }
        // YYYY-MM
        7 => {
            let (ys, ms) = p.split_once('-').ok_or_else(invalid)?;
            let y: i32 = ys.parse().map_err(|_| invalid())?;
            let m: u32 = ms.parse().map_err(|_| invalid())?;
            let last = month_last_day(y, m).ok_or_else(invalid)?;

            let d1 = NaiveDate::from_ymd_opt(y, m, 1).ok_or_else(invalid)?;
            let d2 = NaiveDate::from_ymd_opt(y, m, last).ok_or_else(invalid)?;
            Ok((d1, d2))
        }
        // YYYY-MM-DD
        10 => {
            let d = NaiveDate::parse_from_str(p, "%Y-%m-%d").map_err(|_| invalid())?;
            Ok((d, d))
        }
        _ => Err(invalid()),
    }
}
