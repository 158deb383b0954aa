use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go in a Field/Value table; array-of-object fields
/// (the convergence history) each get their own table underneath.
pub fn print_table(value: &Value) {
    print!("{}", render_table(value));
}

fn render_table(value: &Value) -> String {
    let mut out = String::new();

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                render_result(result, &mut out);
                render_envelope(map, &mut out);
            }
            _ => render_fields(map, &mut out),
        },
        other => out.push_str(&format!("{}\n", format_value(other))),
    }

    out
}

fn render_result(result: &Map<String, Value>, out: &mut String) {
    let mut scalars = Map::new();
    let mut series = Vec::new();

    for (key, val) in result {
        match val {
            Value::Array(rows) if rows.iter().all(Value::is_object) && !rows.is_empty() => {
                series.push((key, rows))
            }
            _ => {
                scalars.insert(key.clone(), val.clone());
            }
        }
    }

    render_fields(&scalars, out);

    for (key, rows) in series {
        out.push_str(&format!("\n{}:\n", key));
        out.push_str(&format!("{}\n", rows_table(rows)));
    }
}

fn render_envelope(envelope: &Map<String, Value>, out: &mut String) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for w in warnings.iter().filter_map(Value::as_str) {
                out.push_str(&format!("  - {}\n", w));
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        out.push_str(&format!("\nMethodology: {}\n", meth));
    }
}

fn render_fields(map: &Map<String, Value>, out: &mut String) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    out.push_str(&format!("{}\n", Table::from(builder)));
}

fn rows_table(rows: &[Value]) -> Table {
    let headers: Vec<String> = rows
        .first()
        .and_then(Value::as_object)
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default();

    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows.iter().filter_map(Value::as_object) {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(h.as_str()).map(format_value).unwrap_or_default())
            .collect();
        builder.push_record(cells);
    }
    Table::from(builder)
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
