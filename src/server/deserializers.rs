use serde::{Deserialize, Deserializer};

// tells a missing field (`None`, via `#[serde(default)]`) apart from an explicit
// `null` (`Some(None)`)
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
