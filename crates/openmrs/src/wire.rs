//! Loosely typed scalar fields shared by the wire models.

use crate::{OpenMrsError, OpenMrsResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A value the API sends either as a JSON string or as a JSON number.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub(crate) enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl TextOrNumber {
    /// Returns the value as text, or `None` when it is blank.
    pub(crate) fn into_text(self) -> Option<String> {
        let text = match self {
            TextOrNumber::Text(s) => s.trim().to_owned(),
            TextOrNumber::Number(n) => n.to_string(),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// A boolean flag the API encodes as `0`/`1` or as a JSON boolean.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub(crate) enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    /// Only an explicit `1` or `true` counts as set.
    pub(crate) fn is_set(self) -> bool {
        matches!(self, Flag::Bool(true) | Flag::Int(1))
    }
}

/// Deserialises `json_text` into `T`, reporting the failing field path on mismatch.
pub(crate) fn from_json_with_path<T: DeserializeOwned>(
    json_text: &str,
    what: &str,
) -> OpenMrsResult<T> {
    let mut deserializer = serde_json::Deserializer::from_str(json_text);
    match serde_path_to_error::deserialize::<_, T>(&mut deserializer) {
        Ok(parsed) => {
            deserializer.end()?;
            Ok(parsed)
        }
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>"
            } else {
                path.as_str()
            };
            Err(OpenMrsError::Translation(format!(
                "{what} schema mismatch at {path}: {source}"
            )))
        }
    }
}

/// Drops blank strings so that `""` and `null` mean the same thing downstream.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
