//! The slice of a Portal profile schema needed for type-casting.
//!
//! Profiles are published at `https://www.encodeproject.org/profiles/<name>.json`;
//! callers download them and hand the document to [`ProfileSchema`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{RegisterError, RegisterResult};

/// JSON-schema `type` of a property or array item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    /// Missing or unrecognised type; values are kept as strings.
    #[default]
    #[serde(other)]
    Other,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::String => "string",
            PropertyType::Integer => "integer",
            PropertyType::Number => "number",
            PropertyType::Boolean => "boolean",
            PropertyType::Object => "object",
            PropertyType::Array => "array",
            PropertyType::Other => "untyped",
        }
    }
}

/// Schema of the elements of an array-typed property.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ItemSchema {
    #[serde(rename = "type", default, deserialize_with = "primary_type")]
    pub kind: PropertyType,
}

/// Schema of one profile property.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type", default, deserialize_with = "primary_type")]
    pub kind: PropertyType,
    #[serde(default)]
    pub items: Option<ItemSchema>,
}

impl PropertySchema {
    /// Type of array elements; untyped when the schema omits `items`.
    pub fn item_kind(&self) -> PropertyType {
        self.items.as_ref().map(|i| i.kind).unwrap_or_default()
    }
}

/// A profile schema reduced to its properties.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileSchema {
    #[serde(default)]
    pub title: Option<String>,
    pub properties: BTreeMap<String, PropertySchema>,
}

impl ProfileSchema {
    pub fn from_json_str(s: &str) -> RegisterResult<Self> {
        serde_json::from_str(s).map_err(|e| RegisterError::Schema {
            origin: "document".into(),
            reason: e.to_string(),
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> RegisterResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RegisterError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| RegisterError::Schema {
            origin: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }
}

/// Accept `"type": "x"` as well as `"type": ["x", "null"]`, keeping the
/// first non-null entry.
fn primary_type<'de, D>(deserializer: D) -> Result<PropertyType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let name = match &raw {
        Value::String(s) => Some(s.as_str()),
        Value::Array(items) => items.iter().filter_map(Value::as_str).find(|t| *t != "null"),
        _ => None,
    };
    Ok(match name {
        Some(name) => PropertyType::deserialize(Value::String(name.to_string()))
            .unwrap_or(PropertyType::Other),
        None => PropertyType::Other,
    })
}
