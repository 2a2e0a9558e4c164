//! Serde helpers for partial-update payloads.
//!
//! Nullable fields in update requests are modeled as `Option<Option<T>>`:
//!
//! - field absent: `None` (leave unchanged)
//! - field `null`: `Some(None)` (clear)
//! - field set: `Some(Some(value))`
//!
//! Use with `#[serde(default, deserialize_with = "double_option")]`.

use serde::{Deserialize, Deserializer};

pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Splits a nullable patch field into `(present, value)` for SQL binding.
pub fn presence<T: Clone>(field: &Option<Option<T>>) -> (bool, Option<T>) {
    match field {
        Some(value) => (true, value.clone()),
        None => (false, None),
    }
}
