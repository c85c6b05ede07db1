// src/deutils.rs
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::convert::TryInto;


/// Treat an explicit `null` like a missing field.
pub fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Integer that may arrive as a number, a numeric string or null (-> 0).
pub fn deserialize_numeric_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let v = Value::deserialize(deserializer)?;
    if v.is_null() {
        return Ok(0);
    }
    let n = v
        .as_i64()
        .or_else(|| v.as_f64().map(|f| f as i64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| D::Error::custom("non-integer"))?
        .try_into()
        .map_err(|_| D::Error::custom("negative"))?;
    Ok(n)
}

#[derive(Deserialize)]
struct NamedArtist {
    #[serde(default)]
    name: Option<String>,
}

/// Collapse an artist array into one display string.
///
/// Names are joined with ", "; entries without a name are skipped, and a
/// missing or null array yields an empty string.
pub fn deserialize_artist_names<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let artists = Option::<Vec<NamedArtist>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(join_names(artists.iter().filter_map(|a| a.name.as_deref())))
}

pub fn join_names<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
