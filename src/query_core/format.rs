//! Numeric formatting for JSON output
//!
//! Numbers leave the service as plain decimal strings so JSON parsers on the
//! client never see an exponent or lose integer precision.

use super::error::QueryError;
use super::store::RowSet;
use rusqlite::types::Value;
use serde_json::{Map, Value as JsonValue};

/// Render an integer exactly.
pub fn format_integer(v: i64) -> String {
    v.to_string()
}

/// Render a float in positional notation.
///
/// Uses the shortest digit string that round-trips to the same `f64`, with no
/// exponent and no trailing zeros (`1.0 → "1"`, `1e-7 → "0.0000001"`).
pub fn format_real(v: f64) -> String {
    // f64's Display is positional and shortest round-trip
    format!("{}", v)
}

/// Convert one stored value into its JSON wire form.
pub fn format_value(value: Value) -> Result<JsonValue, QueryError> {
    match value {
        Value::Null => Ok(JsonValue::Null),
        Value::Integer(v) => Ok(JsonValue::String(format_integer(v))),
        Value::Real(v) => Ok(JsonValue::String(format_real(v))),
        Value::Text(s) => Ok(JsonValue::String(s)),
        Value::Blob(b) => Err(QueryError::UnexpectedFailure(format!(
            "Cannot serialize binary column value ({} bytes)",
            b.len()
        ))),
    }
}

/// Windowed endpoints: one array per row, values in table-column order.
pub fn render_positional(rows: RowSet) -> Result<Vec<Vec<JsonValue>>, QueryError> {
    rows.rows
        .into_iter()
        .map(|row| row.into_iter().map(format_value).collect())
        .collect()
}

/// Reference endpoints: one object per row, keyed by column name.
pub fn render_named(rows: RowSet) -> Result<Vec<Map<String, JsonValue>>, QueryError> {
    let RowSet { columns, rows } = rows;
    rows.into_iter()
        .map(|row| {
            columns
                .iter()
                .cloned()
                .zip(row)
                .map(|(name, value)| format_value(value).map(|v| (name, v)))
                .collect()
        })
        .collect()
}
