//! Forgiving field decoders for loosely typed API payloads.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(super) fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_string(deserializer)?.unwrap_or_default())
}

pub(super) fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) if !text.trim().is_empty() => Some(text),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    })
}

pub(super) fn optional_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_float(&value))
}

pub(super) fn optional_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_float(&value).map(|num| num.trunc() as i64))
}

pub(super) fn integer_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_integer(deserializer)?.unwrap_or_default())
}

/// Names from a list of strings or of objects carrying `name` (or `platform.name`).
pub(super) fn name_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(collect_strings(&value, &["/name", "/platform/name"]))
}

/// Image URLs from a list of strings or of objects carrying `image`.
pub(super) fn image_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(collect_strings(&value, &["/image"]))
}

fn collect_strings(value: &Value, pointers: &[&str]) -> Vec<String> {
    let Value::Array(entries) = value else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(text) => Some(text.as_str()),
            Value::Object(_) => pointers
                .iter()
                .find_map(|pointer| entry.pointer(pointer).and_then(Value::as_str)),
            _ => None,
        })
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

fn as_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(num) => num.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|num| num.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_ignore_unusable_entries() {
        let names = collect_strings(
            &json!(["RPG", {"name": " Strategy "}, {"slug": "x"}, null, ""]),
            &["/name"],
        );
        assert_eq!(names, vec!["RPG", "Strategy"]);
        assert!(collect_strings(&json!({"name": "RPG"}), &["/name"]).is_empty());
    }

    #[test]
    fn numbers_accept_strings() {
        assert_eq!(as_float(&json!("4.5")), Some(4.5));
        assert_eq!(as_float(&json!("n/a")), None);
        assert_eq!(as_float(&json!(null)), None);
        assert_eq!(as_float(&json!(3)), Some(3.0));
    }
}
