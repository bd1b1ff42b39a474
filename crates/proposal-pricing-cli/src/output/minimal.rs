use serde_json::Value;

/// Headline figure per command, in priority order.
const HEADLINE_KEYS: [&str; 10] = [
    "total_price",
    "is_valid",
    "probability_weighted_profit",
    "total_profit",
    "total_taxes",
    "total_monthly_cost",
    "duplicates",
    "suggestions",
    "risks",
    "format_version",
];

/// Print just the headline value of a command's output.
///
/// Nested objects one level down (e.g. `analysis` in a cost analysis) are
/// searched as well before falling back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(headline) = find_headline(result_obj) {
        println!("{}", format_minimal(headline));
        return;
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn find_headline(value: &Value) -> Option<&Value> {
    let map = value.as_object()?;
    for key in HEADLINE_KEYS {
        if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
            return Some(val);
        }
    }
    map.values()
        .filter(|v| v.is_object())
        .find_map(|nested| {
            let inner = nested.as_object()?;
            HEADLINE_KEYS
                .iter()
                .find_map(|k| inner.get(*k).filter(|v| !v.is_null()))
        })
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => serde_json::to_string(other).unwrap_or_default(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
