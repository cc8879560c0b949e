//! HTTP handlers, grouped by resource.

pub mod collaborators;
pub mod folders;
pub mod notes;

use serde::{Deserialize, Deserializer};

/// Deserialize a nullable patch field: an absent key stays `None`, an
/// explicit `null` becomes `Some(None)` (clear the column).
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
