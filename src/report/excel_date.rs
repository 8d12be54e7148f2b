// src/report/excel_date.rs

use crate::models::field::parse_calendar_day;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub(crate) const DATE_FORMAT: &str = "yyyy-mm-dd";
pub(crate) const TIME_FORMAT: &str = "hh:mm";

/// Excel serial number of a calendar day.
pub(crate) fn date_to_excel_serial(d: NaiveDate) -> f64 {
    naive_datetime_to_excel_serial(&d.and_time(NaiveTime::MIN))
}

/// Excel serial (fraction of a day) of a wall-clock time.
pub(crate) fn time_to_excel_serial(t: NaiveTime) -> f64 {
    t.num_seconds_from_midnight() as f64 / 86400.0
}

/// Interpret a stored date or timestamp string as an Excel date serial.
pub(crate) fn parse_to_excel_date(s: &str) -> Option<f64> {
    parse_calendar_day(s).map(date_to_excel_serial)
}

pub(crate) fn parse_to_excel_time(s: &str) -> Option<f64> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .ok()
        .map(time_to_excel_serial)
}

fn naive_datetime_to_excel_serial(dt: &NaiveDateTime) -> f64 {
    let excel_epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or(NaiveDate::MIN)
        .and_time(NaiveTime::MIN);

    let duration = *dt - excel_epoch;

    let days = duration.num_days() as f64;
    let secs = (duration.num_seconds() - duration.num_days() * 86400) as f64;

    days + secs / 86400.0
}
