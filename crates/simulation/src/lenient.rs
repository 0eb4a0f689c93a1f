//! Tolerant field readers for numbers in saved documents.
//!
//! Saves written by the JS build store NaN as `null`, and hand-edited or
//! older saves can carry fractions or negatives in integer fields. These
//! readers coerce such values instead of failing the whole document; the
//! migrator then normalises or drops them.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Any JSON number as `f64`; anything else reads as NaN.
pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Value::deserialize(deserializer)?
        .as_f64()
        .unwrap_or(f64::NAN))
}

/// A resource map whose amounts are read with [`amount`].
pub fn amounts<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, f64>, D::Error> {
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(res, value)| (res, value.as_f64().unwrap_or(f64::NAN)))
        .collect())
}

/// A non-negative count. Fractions are truncated; negative, non-finite,
/// out-of-range and non-numeric values yield `None`.
fn count(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let n = value.as_f64()?;
    if n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX) {
        Some(n.trunc() as u32)
    } else {
        None
    }
}

fn count_or<'de, D: Deserializer<'de>>(deserializer: D, fallback: u32) -> Result<u32, D::Error> {
    Ok(count(&Value::deserialize(deserializer)?).unwrap_or(fallback))
}

/// Count falling back to `0`.
pub fn count_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    count_or(deserializer, 0)
}

/// Count falling back to `1` (levels, stockpile capacity).
pub fn count_or_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    count_or(deserializer, 1)
}

/// Priority falling back to the regular priority.
pub fn priority<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    count_or(deserializer, crate::config::PRIORITY_REGULAR)
}
