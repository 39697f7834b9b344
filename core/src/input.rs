use anyhow::{anyhow, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parses a user-typed amount. Anything that is not a finite, non-negative
/// number collapses to `0.0`.
pub fn parse_amount(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .map(sanitize_amount)
        .unwrap_or(0.0)
}

pub fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Accepts a JSON number or numeric string; older records stored amounts as text.
pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(amount_from_value(&value))
}

pub(crate) fn amount_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => sanitize_amount(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => parse_amount(s),
        _ => 0.0,
    }
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    let key = key.trim();

    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| !key.is_empty() && c.to_lowercase().starts_with(&key.to_lowercase()))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown value: '{}'", key)),
        _ => Err(anyhow!("Ambiguous value: '{}' matches {:?}", key, matches)),
    }
}
