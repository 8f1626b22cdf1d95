use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimeFormatError {
    #[error("Unrecognised date shape: '{0}'")]
    InvalidShape(String),

    #[error("Invalid {field} in '{input}'")]
    InvalidComponent { field: &'static str, input: String },

    #[error("Date or time out of range: '{0}'")]
    OutOfRange(String),
}

fn component<T: FromStr>(value: &str, field: &'static str, input: &str) -> Result<T, TimeFormatError> {
    value
        .trim()
        .parse()
        .map_err(|_| TimeFormatError::InvalidComponent {
            field,
            input: input.to_string(),
        })
}

/// Convert a spreadsheet-style date to the API's ISO form.
///
/// Accepts `DD/MM/YYYY`, `DD/MM/YYYY HH:MM` and `DD/MM/YYYY HH:MM:SS`,
/// with configurable date and hour delimiters, and returns
/// `YYYY-MM-DDTHH:MM:SS.000Z`.
pub fn time_format(
    dt: &str,
    date_delimiter: &str,
    hour_delimiter: &str,
) -> Result<String, TimeFormatError> {
    let shape_error = || TimeFormatError::InvalidShape(dt.to_string());

    let mut parts = dt.split_whitespace();
    let date_part = parts.next().ok_or_else(shape_error)?;
    let time_part = parts.next();
    if parts.next().is_some() {
        return Err(shape_error());
    }

    let date_fields: Vec<&str> = date_part.split(date_delimiter).collect();
    let [day, month, year] = date_fields.as_slice() else {
        return Err(shape_error());
    };
    let day: u32 = component(day, "day", dt)?;
    let month: u32 = component(month, "month", dt)?;
    let year: i32 = component(year, "year", dt)?;

    let (hour, minute, second) = match time_part {
        None => (0, 0, 0),
        Some(time) => {
            let time_fields: Vec<&str> = time.split(hour_delimiter).collect();
            match time_fields.as_slice() {
                [h, m] => (component(h, "hour", dt)?, component(m, "minute", dt)?, 0),
                [h, m, s] => (
                    component(h, "hour", dt)?,
                    component(m, "minute", dt)?,
                    component(s, "second", dt)?,
                ),
                _ => return Err(shape_error()),
            }
        }
    };

    let datetime = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| TimeFormatError::OutOfRange(dt.to_string()))?;
    Ok(datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

fn sort_keys_recursive(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_keys_recursive(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys_recursive).collect()),
        other => other.clone(),
    }
}

/// Render JSON with 4-space indentation, optionally sorting keys
pub fn pretty_format(value: &Value, sort_keys: bool) -> String {
    let sorted;
    let value = if sort_keys {
        sorted = sort_keys_recursive(value);
        &sorted
    } else {
        value
    };

    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    // Serializing a Value into a Vec cannot fail
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Print a response to stdout in a readable form
pub fn pretty_print(value: &Value, sort_keys: bool) {
    if is_empty(value) {
        warn!("No data to print");
        return;
    }
    println!("{}", pretty_format(value, sort_keys));
    info!("Results printed to the console");
}
