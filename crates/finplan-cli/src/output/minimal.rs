use serde_json::Value;

/// Fields checked in order for the headline figure of a calculator.
const PRIORITY_KEYS: [&str; 8] = [
    "emi",
    "total_emi",
    "future_value",
    "maturity_amount",
    "total_amount",
    "required_monthly_sip",
    "total_tax",
    "recommended",
];

/// Print just the headline figure of the output.
///
/// Looks for well-known result fields in priority order, then falls back to
/// the first field in the result object. Lists print one `id` per line.
pub fn print_minimal(value: &Value) {
    if let Value::Array(items) = value {
        for item in items {
            match item.get("id") {
                Some(id) => println!("{}", format_minimal(id)),
                None => println!("{}", format_minimal(item)),
            }
        }
        return;
    }

    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
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
