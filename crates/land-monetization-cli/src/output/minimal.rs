use serde_json::Value;

/// Headline fields, in the order they are looked for.
const PRIORITY_KEYS: [&str; 4] = ["npv", "irr", "payback_year", "feasible"];

/// Print the headline figures of a result on one line.
///
/// A simulation prints `npv irr payback_year feasible` space-separated
/// (`-` for an absent IRR or payback). A sweep prints the value at which
/// feasibility flips. Anything else prints its first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    println!("{}", minimal_line(result_obj));
}

fn minimal_line(result: &Value) -> String {
    let Value::Object(map) = result else {
        return format_minimal(result);
    };

    if map.contains_key("npv") {
        return PRIORITY_KEYS
            .iter()
            .map(|k| map.get(*k).map(format_minimal).unwrap_or_else(|| "-".into()))
            .collect::<Vec<_>>()
            .join(" ");
    }

    if let Some(flip) = map.get("feasibility_flip_at") {
        return format_minimal(flip);
    }

    match map.iter().next() {
        Some((key, val)) => format!("{}: {}", key, format_minimal(val)),
        None => String::new(),
    }
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
