//! `key=value` claim parsing for `issue-token`.

use serde_json::{Map, Value};

/// Parses `key=value` pairs into a claims object. Values that are valid
/// JSON (numbers, booleans, quoted strings, objects) keep their type;
/// anything else becomes a string.
///
/// # Errors
///
/// Returns a message naming the first pair without `=` or with an empty
/// key.
pub fn parse_claims(pairs: &[String]) -> Result<Map<String, Value>, String> {
    let mut claims = Map::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            return Err(format!("Claim {pair:?} is not of the form key=value"));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("Claim {pair:?} has an empty key"));
        }
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        claims.insert(key.to_string(), value);
    }
    Ok(claims)
}
