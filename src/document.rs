//! Document loading and dumping.
//!
//! A workflow document is held as a [`serde_yaml::Value`]: mappings,
//! sequences and scalars. Values are parsed fresh for every comparison and
//! never mutated afterwards.

use std::fs;
use std::path::Path;

use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

use crate::errors::{GoldenError, Result};

/// Parse serialized text into a structural value.
///
/// `origin` names where the text came from and only shows up in errors.
/// Comment lines are dropped by the parser, so a golden file's license banner
/// never reaches the compared structure. No semantic validation happens here.
pub fn load_document(text: &str, origin: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_yaml::from_str(text).map_err(|source| GoldenError::Parse {
        origin: origin.to_string(),
        source,
    })
}

/// Read a file and parse it with [`load_document`].
pub fn read_document(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).map_err(|e| GoldenError::io(path, e))?;
    load_document(&text, &path.display().to_string())
}

/// Block-style YAML with mapping keys in sorted order.
pub fn to_yaml(value: &Value) -> Result<String> {
    serde_yaml::to_string(&sort_keys(value)).map_err(|e| GoldenError::Serialize {
        message: e.to_string(),
    })
}

/// Indented, human-readable JSON dump used in mismatch diagnostics.
pub fn to_pretty_json(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).or_else(|_| {
        // Non-string mapping keys have no JSON form; fall back to YAML.
        serde_yaml::to_string(value).map_err(|e| GoldenError::Serialize {
            message: e.to_string(),
        })
    })
}

/// Compact single-line textual form of a value.
pub fn to_compact_text(value: &Value) -> String {
    match serde_json::to_string(value) {
        Ok(text) => text,
        Err(_) => serde_yaml::to_string(value).unwrap_or_else(|_| format!("{:?}", value)),
    }
}

/// Key ordering key for a mapping entry.
pub(crate) fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => to_compact_text(other),
    }
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(&Value, &Value)> = map.iter().collect();
            entries.sort_by_key(|(k, _)| key_text(k));
            let mut sorted = Mapping::with_capacity(entries.len());
            for (k, v) in entries {
                sorted.insert(k.clone(), sort_keys(v));
            }
            Value::Mapping(sorted)
        }
        Value::Sequence(items) => Value::Sequence(items.iter().map(sort_keys).collect()),
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: sort_keys(&tagged.value),
        })),
        other => other.clone(),
    }
}
