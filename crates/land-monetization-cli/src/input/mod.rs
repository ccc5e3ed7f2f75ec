pub mod file;
pub mod stdin;

use land_monetization_core::simulator::overrides::deep_merge;
use serde_json::{Map, Value};

/// Load a parameter document from `--input`, falling back to piped stdin.
/// Returns `Value::Null` when neither is given.
pub fn load_document(path: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_value(path);
    }
    Ok(stdin::read_stdin()?.unwrap_or(Value::Null))
}

/// Parse `--set key=value` pairs into a JSON object.
///
/// Values are read as JSON where possible (`50`, `true`, `"0.04"`) and kept
/// as plain strings otherwise, so `--set discount_rate=0.045` arrives as the
/// number 0.045 and `--set name=north` as the string "north".
pub fn parse_sets(pairs: &[String]) -> Result<Value, Box<dyn std::error::Error>> {
    let mut map = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| format!("--set expects key=value, got '{}'", pair))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("--set has an empty key: '{}'", pair).into());
        }
        let value = serde_json::from_str(raw.trim())
            .unwrap_or_else(|_| Value::String(raw.trim().to_string()));
        map.insert(key.to_string(), value);
    }
    Ok(Value::Object(map))
}

/// Lay `--set` pairs over `base`; a null base becomes just the sets.
pub fn apply_sets(mut base: Value, pairs: &[String]) -> Result<Value, Box<dyn std::error::Error>> {
    if pairs.is_empty() {
        return Ok(base);
    }
    let sets = parse_sets(pairs)?;
    if base.is_null() {
        return Ok(sets);
    }
    deep_merge(&mut base, &sets);
    Ok(base)
}
