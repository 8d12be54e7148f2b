//! Form field definitions and the per-type parse/format dispatch.
//!
//! Every field type maps to exactly one input parser and one display
//! formatter. Types without a dedicated routine use the plain-text pair, so
//! adding a variant without wiring it never silently changes behaviour.

use crate::errors::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use clap::ValueEnum;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Email,
    Textarea,
    Checkbox,
    Radio,
    Select,
    Phone,
    Url,
    Time,
    Rating,
    File,
}

type Parser = fn(&str) -> Result<Value, String>;
type Formatter = fn(&Value) -> String;

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Email => "email",
            FieldType::Textarea => "textarea",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Select => "select",
            FieldType::Phone => "phone",
            FieldType::Url => "url",
            FieldType::Time => "time",
            FieldType::Rating => "rating",
            FieldType::File => "file",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        FieldType::value_variants()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Rating)
    }

    /// Types whose value must be one of the field's options.
    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }

    fn parser(&self) -> Parser {
        match self {
            FieldType::Number => parse_number,
            FieldType::Rating => parse_rating,
            FieldType::Date => parse_date,
            FieldType::Time => parse_time,
            FieldType::Email => parse_email,
            FieldType::Phone => parse_phone,
            FieldType::Url => parse_url,
            FieldType::Checkbox => parse_checkbox,
            _ => parse_text,
        }
    }

    fn formatter(&self) -> Formatter {
        match self {
            FieldType::Number => format_number,
            FieldType::Rating => format_rating,
            FieldType::Date => format_date,
            FieldType::Checkbox => format_checkbox,
            _ => format_plain,
        }
    }

    /// Parse raw user input into the stored JSON value.
    pub fn parse_input(&self, raw: &str) -> Result<Value, String> {
        (self.parser())(raw.trim())
    }

    /// Render a stored value for display.
    pub fn format_value(&self, value: &Value) -> String {
        if value.is_null() {
            return String::new();
        }
        (self.formatter())(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Field {
    pub fn new(id: &str, label: &str, kind: FieldType) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            options: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|o| o.to_string()).collect());
        self
    }

    /// Check the definition itself (used when adding a field to the catalog).
    pub fn validate_definition(&self) -> AppResult<()> {
        if !valid_field_id(&self.id) {
            return Err(AppError::ValidationFailed(format!(
                "field id '{}' must be lowercase letters, digits or '_' and start with a letter",
                self.id
            )));
        }

        if self.label.trim().is_empty() {
            return Err(AppError::ValidationFailed(format!(
                "field '{}' needs a label",
                self.id
            )));
        }

        if self.kind.has_options() && self.options.as_ref().is_none_or(|o| o.is_empty()) {
            return Err(AppError::ValidationFailed(format!(
                "field '{}' of type {} needs at least one option",
                self.id,
                self.kind.as_str()
            )));
        }

        Ok(())
    }

    /// Parse and validate one raw input value for this field.
    /// An empty input yields `Null`, which is rejected for required fields.
    pub fn parse_value(&self, raw: &str) -> AppResult<Value> {
        if raw.trim().is_empty() {
            if self.required {
                return Err(AppError::ValidationFailed(format!(
                    "'{}' is required",
                    self.label
                )));
            }
            return Ok(Value::Null);
        }

        let value = self
            .kind
            .parse_input(raw)
            .map_err(|e| AppError::ValidationFailed(format!("{}: {e}", self.label)))?;

        if self.kind.has_options()
            && let Some(options) = &self.options
        {
            let chosen = value.as_str().unwrap_or_default();
            if !options.iter().any(|o| o == chosen) {
                return Err(AppError::ValidationFailed(format!(
                    "{}: '{chosen}' is not one of [{}]",
                    self.label,
                    options.join(", ")
                )));
            }
        }

        Ok(value)
    }

    pub fn format_value(&self, value: &Value) -> String {
        self.kind.format_value(value)
    }
}

/// Default form catalog seeded on first initialization.
pub fn default_fields() -> Vec<Field> {
    vec![
        Field::new("name", "Name", FieldType::Text).required(),
        Field::new("email", "Email", FieldType::Email).required(),
        Field::new("phone", "Phone", FieldType::Phone),
        Field::new("company", "Company", FieldType::Text),
        Field::new("address", "Address", FieldType::Textarea),
        Field::new("birth_date", "Birth date", FieldType::Date),
        Field::new("status", "Status", FieldType::Select).with_options(&[
            "Lead", "Active", "Inactive",
        ]),
        Field::new("source", "Source", FieldType::Radio).with_options(&[
            "Referral", "Web", "Event", "Other",
        ]),
        Field::new("revenue", "Revenue", FieldType::Number),
        Field::new("rating", "Rating", FieldType::Rating),
        Field::new("website", "Website", FieldType::Url),
        Field::new("newsletter", "Newsletter", FieldType::Checkbox),
        Field::new("notes", "Notes", FieldType::Textarea),
    ]
}

/// Columns every client record carries besides its form values.
pub fn system_fields() -> Vec<Field> {
    vec![
        Field::new("id", "ID", FieldType::Number),
        Field::new("created_at", "Created at", FieldType::Date),
    ]
}

pub fn valid_field_id(id: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("static regex"))
        .is_match(id)
}

// ---------------------------
// Parsers
// ---------------------------

fn parse_text(s: &str) -> Result<Value, String> {
    Ok(Value::String(s.to_string()))
}

fn parse_number(s: &str) -> Result<Value, String> {
    let n: f64 = normalize_decimal(s)
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .ok_or_else(|| format!("'{s}' is not a finite number"))
}

/// Accept grouped input (`1,234.50`, `1.234,50`) as well as a lone decimal
/// comma (`1200,50`). The last separator present is the decimal one.
fn normalize_decimal(s: &str) -> String {
    let s = s.trim();
    match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (None, Some(_)) if s.matches(',').count() == 1 => s.replace(',', "."),
        (None, Some(_)) => s.replace(',', ""),
        _ => s.to_string(),
    }
}

fn parse_rating(s: &str) -> Result<Value, String> {
    let n: u8 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a rating between 1 and 5"))?;
    if !(1..=5).contains(&n) {
        return Err(format!("rating {n} is outside 1..=5"));
    }
    Ok(Value::from(n))
}

fn parse_date(s: &str) -> Result<Value, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
        .map_err(|_| format!("'{s}' is not a date (YYYY-MM-DD)"))
}

fn parse_time(s: &str) -> Result<Value, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .map(|t| Value::String(t.format("%H:%M").to_string()))
        .map_err(|_| format!("'{s}' is not a time (HH:MM)"))
}

fn parse_email(s: &str) -> Result<Value, String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"));
    if re.is_match(s) {
        Ok(Value::String(s.to_lowercase()))
    } else {
        Err(format!("'{s}' is not a valid email address"))
    }
}

fn parse_phone(s: &str) -> Result<Value, String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^\+?[0-9 ()./-]{6,20}$").expect("static regex"));
    if re.is_match(s) {
        Ok(Value::String(s.to_string()))
    } else {
        Err(format!("'{s}' is not a valid phone number"))
    }
}

fn parse_url(s: &str) -> Result<Value, String> {
    if (s.starts_with("http://") || s.starts_with("https://")) && !s.contains(char::is_whitespace)
    {
        Ok(Value::String(s.to_string()))
    } else {
        Err(format!("'{s}' is not an http(s) URL"))
    }
}

fn parse_checkbox(s: &str) -> Result<Value, String> {
    match s.to_lowercase().as_str() {
        "y" | "yes" | "true" | "1" | "on" | "x" => Ok(Value::Bool(true)),
        "n" | "no" | "false" | "0" | "off" => Ok(Value::Bool(false)),
        other => Err(format!("'{other}' is not yes/no")),
    }
}

// ---------------------------
// Formatters
// ---------------------------

fn format_plain(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(format_plain)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn format_number(v: &Value) -> String {
    match coerce_f64(v) {
        Some(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
        Some(n) => format!("{n:.2}"),
        None => format_plain(v),
    }
}

fn format_rating(v: &Value) -> String {
    match coerce_f64(v) {
        Some(n) => {
            let stars = n.round().clamp(0.0, 5.0) as usize;
            format!("{}{}", "★".repeat(stars), "☆".repeat(5 - stars))
        }
        None => format_plain(v),
    }
}

fn format_checkbox(v: &Value) -> String {
    match v {
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        other => format_plain(other),
    }
}

/// Dates are stored either as `YYYY-MM-DD` or as full timestamps; both
/// display as the calendar day.
fn format_date(v: &Value) -> String {
    match v.as_str() {
        Some(s) => parse_calendar_day(s)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| s.to_string()),
        None => format_plain(v),
    }
}

pub(crate) fn parse_calendar_day(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Lenient numeric view of a JSON value (numbers and numeric strings).
pub fn coerce_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
