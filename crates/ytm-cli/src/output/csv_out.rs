use serde_json::Value;
use std::io::{self, Write};

use super::result_of;

/// Write output as CSV to stdout.
///
/// A solve writes its convergence history (`iteration,yield_rate`); any other
/// result is written as two-column `field,value` rows.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let _ = write_csv(stdout.lock(), value);
}

fn write_csv<W: Write>(writer: W, value: &Value) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let result = result_of(value);

    match result {
        Value::Object(map) => {
            if let Some(Value::Array(history)) = map.get("history") {
                wtr.write_record(["iteration", "yield_rate"])?;
                for point in history {
                    wtr.write_record([
                        format_csv_value(&point["iteration"]),
                        format_csv_value(&point["yield_rate"]),
                    ])?;
                }
            } else {
                wtr.write_record(["field", "value"])?;
                for (key, val) in map {
                    wtr.write_record([key.as_str(), &format_csv_value(val)])?;
                }
            }
        }
        other => wtr.write_record([&format_csv_value(other)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn csv_string(value: &Value) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, value).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_history_rows() {
        let value = json!({
            "result": {
                "ytm": "0.0567",
                "history": [
                    { "iteration": 0, "yield_rate": "0.05" },
                    { "iteration": 1, "yield_rate": "0.0567" }
                ]
            }
        });
        assert_eq!(
            csv_string(&value),
            "iteration,yield_rate\n0,0.05\n1,0.0567\n"
        );
    }

    #[test]
    fn test_field_value_rows() {
        let value = json!({ "result": { "discount_or_premium": "par", "price": "1000" } });
        assert_eq!(
            csv_string(&value),
            "field,value\ndiscount_or_premium,par\nprice,1000\n"
        );
    }
}
