//! Helpers for partial-update bodies, where an explicit `null` differs from
//! an absent field.

use serde::{Deserialize, Deserializer};

use crate::CoreError;

/// Deserializes a field that is present in the body, `null` included.
/// Pair with `#[serde(default)]`: absent is `None`, `null` is `Some(None)`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Unwraps a present, non-nullable field.
pub(crate) fn required<T>(field: &str, value: Option<T>) -> Result<T, CoreError> {
    value.ok_or_else(|| CoreError::Validation(format!("{} may not be null.", field)))
}
