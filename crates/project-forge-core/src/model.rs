//! Project data model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key a payload record uses to reference a structure.
pub const STRUCTURE_REF_KEY: &str = "structure_name";

/// A session binding an opaque token to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token handed to the caller.
    #[serde(rename = "session_key")]
    pub token: String,
    /// Project the token is bound to for its lifetime.
    pub project_name: String,
}

/// A single field of a structure.
///
/// The `type` tag is free-form (`"string"`, `"int"`, `"embedding"`, ...) and
/// is never checked against payload values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name, unique within its structure.
    pub name: String,

    /// Free-form type tag.
    #[serde(rename = "type", default)]
    pub field_type: String,

    /// Whether the field is marked as required.
    #[serde(default)]
    pub required: bool,

    /// Open attribute bag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl Field {
    /// Create an optional field with the given type tag.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            required: false,
            meta: None,
        }
    }

    /// Mark the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: Value) -> Self {
        self.meta
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }
}

/// A named, ordered set of fields describing a record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    /// Structure name, unique within its project.
    pub name: String,

    /// Optional human readable description.
    #[serde(default)]
    pub description: Option<String>,

    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Structure {
    /// Create a structure from a name and its fields.
    #[must_use]
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Iterate over the field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// A named record carrying a list of arbitrary payload values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message name, unique within its project.
    pub name: String,

    /// Registration time. Filled in by the registry when absent.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Payload records.
    #[serde(default)]
    pub payload: Vec<Value>,
}

impl Message {
    /// Create a message without a timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>, payload: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            created_at: None,
            payload,
        }
    }

    /// Structure names referenced by the payload, in payload order.
    ///
    /// Objects whose `structure_name` is `null` or the empty string are
    /// treated as not referencing anything.
    pub fn structure_refs(&self) -> impl Iterator<Item = &Value> {
        self.payload
            .iter()
            .filter_map(|record| record.as_object()?.get(STRUCTURE_REF_KEY))
            .filter(|value| !matches!(value, Value::Null) && value.as_str() != Some(""))
    }
}

/// Snapshot of a project returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectData {
    /// Project name.
    pub project_name: String,
    /// Structures by name.
    pub structures: BTreeMap<String, Structure>,
    /// Messages by name.
    pub messages: BTreeMap<String, Message>,
}

impl ProjectData {
    /// Create an empty snapshot for a project.
    #[must_use]
    pub fn empty(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            ..Self::default()
        }
    }
}
