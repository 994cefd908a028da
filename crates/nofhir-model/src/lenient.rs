//! Tolerant element decoding.
//!
//! A server may send an element with the wrong JSON type (`"given": "Ola"`).
//! Such an element decodes as absent, so the rule sets still run and report
//! it, instead of the whole resource failing to decode.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `deserialize_with` helper for optional elements: a value of the wrong
/// shape becomes `None`.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}
