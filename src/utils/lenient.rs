//! Serde helpers for loosely-typed upstream payloads.
//!
//! Platform APIs send `null` or the wrong type for fields that are usually
//! present. These helpers fall back to the type's default instead of failing
//! the whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize `T`, using `T::default()` for `null` or mistyped values.
///
/// Pair with `#[serde(default)]` so that missing fields are covered too.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}
