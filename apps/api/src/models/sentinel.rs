//! Serialization edge for absent values.
//!
//! Records hold `Option<String>` and plain vectors. Only when a record is
//! written out does an absent value turn into the display sentinel, and
//! reading a record back maps the sentinel (or an empty string) to absence.

use serde::{Deserialize, Deserializer, Serializer};

/// Display placeholder for a field that could not be extracted.
pub const NOT_FOUND: &str = "N/A";

/// True for the sentinel itself and for blank strings.
pub fn is_sentinel(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(NOT_FOUND)
}

/// `#[serde(with = "sentinel::optional")]` for `Option<String>` fields.
pub mod optional {
    use super::*;

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(NOT_FOUND))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|v| !is_sentinel(v)))
    }
}

/// `#[serde(with = "sentinel::skills")]` for skill lists: an empty list is
/// written as `["N/A"]`.
pub mod skills {
    use super::*;

    pub fn serialize<S>(value: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if value.is_empty() {
            serializer.collect_seq([NOT_FOUND])
        } else {
            serializer.collect_seq(value)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Vec<String>>::deserialize(deserializer)?;
        Ok(value
            .unwrap_or_default()
            .into_iter()
            .filter(|v| !is_sentinel(v))
            .collect())
    }
}
