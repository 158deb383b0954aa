use serde_json::Value;

use super::result_of;

/// Result fields tried in order when printing a single answer.
const PRIORITY_KEYS: [&str; 3] = ["ytm_pct", "ytm", "price"];

/// Print just the headline number: the YTM percentage for a solve, the
/// price for a pricing run.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

fn minimal_answer(value: &Value) -> String {
    let result = result_of(value);

    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return format_minimal(val);
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
