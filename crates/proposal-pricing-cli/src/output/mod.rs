pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Render a command's output in the requested format.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Scalar rendering shared by the table and CSV writers.
pub(crate) fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// The first array of objects inside a result, e.g. monthly projections,
/// scenarios or cost entries; used for row-per-item rendering.
pub(crate) fn row_array(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(arr) if arr.first().map_or(false, Value::is_object) => Some(arr),
        Value::Object(map) => map.values().find_map(|v| match v {
            Value::Array(arr) if arr.first().map_or(false, Value::is_object) => Some(arr),
            _ => None,
        }),
        _ => None,
    }
}
