//! Cell text resolution shared by the CSV, XLSX and PDF writers.

use crate::domain::model::{CellFormat, ColumnDefinition, Record};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Renders a JSON value as cell text. `null` becomes the empty string.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // 非純量值以精簡 JSON 呈現
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Text for `record[column.field_key]`, empty when the field is missing.
pub fn cell_text(record: &Record, column: &ColumnDefinition) -> String {
    let Some(value) = record.get(&column.field_key) else {
        return String::new();
    };

    let text = value_text(value);
    match column.format {
        CellFormat::Text => text,
        CellFormat::DateMedium => format_date_medium(&text).unwrap_or(text),
    }
}

pub fn row_values(record: &Record, columns: &[ColumnDefinition]) -> Vec<String> {
    columns.iter().map(|column| cell_text(record, column)).collect()
}

pub fn header_values(columns: &[ColumnDefinition]) -> Vec<&str> {
    columns.iter().map(|column| column.header.as_str()).collect()
}

/// `1990-01-05` or an RFC 3339 timestamp -> `Jan 5, 1990`.
pub fn format_date_medium(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })?;

    Some(date.format("%b %-d, %Y").to_string())
}
