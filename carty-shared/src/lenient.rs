//! Deserializers for fields the backend sends either as numbers or as strings.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrString::Int(v)) => Some(v as f64),
        Some(NumberOrString::Float(v)) => Some(v),
        Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrString::Int(v)) => Some(v),
        Some(NumberOrString::Float(v)) => Some(v as i64),
        Some(NumberOrString::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Accepts `"5"`, `5` or `null` and yields a string (or `None`).
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrString::Int(v)) => Some(v.to_string()),
        Some(NumberOrString::Float(v)) => Some(v.to_string()),
        Some(NumberOrString::Text(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}
