//! Tolerant field decoders for project documents.
//!
//! Documents are written by a browser client that happily stores `null`,
//! `""` or `"12"` where a number belongs. These helpers coerce instead of
//! failing, so one sloppy field never makes a whole project unreadable.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse the leading numeric token of a cell: `"5"`, `"5 days"`, `"4.5d"`.
pub fn leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Weight: any finite non-negative number, everything else is 0.
pub fn weight<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(coerce_number)
        .filter(|v| *v > 0.0)
        .unwrap_or(0.0))
}

/// Percentage: rounded half-to-even and clamped to 0..=100.
pub fn percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let raw = value.as_ref().and_then(coerce_number).unwrap_or(0.0);
    Ok(raw.round_ties_even().clamp(0.0, 100.0) as u8)
}

/// Day counts: non-negative whole days, bad input is 0.
pub fn days<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let raw = value.as_ref().and_then(coerce_number).unwrap_or(0.0);
    Ok(raw.round().clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// Optional duration: `null` stays absent, text is read by its leading
/// number and falls back to 0.
pub fn duration<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(leading_number(&s).unwrap_or(0.0)),
        Some(other) => Some(coerce_number(&other).unwrap_or(0.0)),
    })
}

/// `null` decodes to the type's default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
