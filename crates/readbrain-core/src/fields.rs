//! Field-level deserializers for hand-written and generated records.
//!
//! Note metadata is edited by hand, so a single mistyped field must not
//! discard the rest of the record. Each helper first captures the raw value
//! and only then tries the target type, falling back to the type's default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize `T`, or `T::default()` if the value has the wrong shape.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(raw.clone()).unwrap_or_else(|e| {
        tracing::warn!("ignoring malformed field value {raw}: {e}");
        T::default()
    }))
}

/// Deserialize a non-negative integer written either as a number or as a
/// numeric string (`3` or `'3'`). Anything else becomes 0.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_u32(deserializer)?.unwrap_or_default())
}

/// Like [`lenient_u32`] but reports absent or unusable values as `None`.
pub fn lenient_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let parsed = match &raw {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    if parsed.is_none() {
        tracing::warn!("ignoring malformed integer field value {raw}");
    }
    Ok(parsed)
}

/// Deserialize any scalar as its string form. Dates written without quotes
/// and bare numbers both end up as text; null and collections become `""`.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(&raw))
}

/// Like [`lenient_string`] but keeps absence distinct from an empty value.
pub fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Null => None,
        other => Some(scalar_to_string(&other)),
    })
}

/// Deserialize a list of strings, stringifying scalar items and dropping
/// anything else. A single scalar is treated as a one-element list.
pub fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(strings_from(raw))
}

/// Same as [`lenient_strings`] but keeps "not declared" apart from "empty".
pub fn lenient_opt_strings<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Null => None,
        other => Some(strings_from(other)),
    })
}

fn strings_from(raw: Value) -> Vec<String> {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter(|v| !matches!(v, Value::Null | Value::Array(_) | Value::Object(_)))
            .map(scalar_to_string)
            .collect(),
        Value::Null | Value::Object(_) => Vec::new(),
        scalar => vec![scalar_to_string(&scalar)],
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
