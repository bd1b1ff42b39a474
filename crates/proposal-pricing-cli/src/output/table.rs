use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{row_array, scalar};

/// Render output as tables: scalar fields as a Field/Value table, then one
/// table per list of items (scenarios, cost lines, KPIs, alerts...).
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_envelope(result, map),
            None => print_object(map),
        },
        Value::Array(arr) => print_rows(arr),
        _ => println!("{value}"),
    }
}

fn print_envelope(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res) => print_object(res),
        Value::Array(arr) => print_rows(arr),
        other => println!("{other}"),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }
    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {methodology}");
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut lists: Vec<(&str, &Vec<Value>)> = Vec::new();
    for (key, val) in map {
        match val {
            Value::Array(arr) if arr.first().map_or(false, Value::is_object) => {
                lists.push((key.as_str(), arr));
            }
            Value::Array(arr) => {
                let items: Vec<String> = arr.iter().map(scalar).collect();
                builder.push_record([key.clone(), items.join(", ")]);
            }
            Value::Object(inner) if row_array(val).is_none() => {
                for (k, v) in inner {
                    builder.push_record([format!("{key}.{k}"), scalar(v)]);
                }
            }
            _ => builder.push_record([key.clone(), scalar(val)]),
        }
    }
    println!("{}", Table::from(builder));

    for (name, rows) in lists {
        println!("\n{name}:");
        print_rows(rows);
    }
}

fn print_rows(arr: &[Value]) {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", scalar(item));
        }
        return;
    };

    // nested lists (e.g. a scenario's projections) are too wide for a row
    let headers: Vec<String> = first
        .iter()
        .filter(|(_, v)| !v.is_array())
        .map(|(k, _)| k.clone())
        .collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(scalar).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}
