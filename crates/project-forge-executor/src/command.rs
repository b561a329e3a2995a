//! Command blocks and argument normalization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Actions the dispatcher knows how to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SetStructure,
    SetMessage,
    GetProjectData,
}

impl ActionKind {
    /// Parse an action name. Returns `None` for unknown actions.
    #[must_use]
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "set_structure" => Some(Self::SetStructure),
            "set_message" => Some(Self::SetMessage),
            "get_project_data" => Some(Self::GetProjectData),
            _ => None,
        }
    }

    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SetStructure => "set_structure",
            Self::SetMessage => "set_message",
            Self::GetProjectData => "get_project_data",
        }
    }
}

/// One action to apply to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Action name as emitted (possibly unknown).
    pub action: String,
    /// Raw argument mapping.
    #[serde(default = "empty_arguments")]
    pub arguments: Value,
}

fn empty_arguments() -> Value {
    Value::Object(Map::new())
}

fn or_empty(arguments: Option<Value>) -> Value {
    match arguments {
        None | Some(Value::Null) => empty_arguments(),
        Some(arguments) => arguments,
    }
}

impl Command {
    /// Create a new command.
    #[must_use]
    pub fn new(action: impl Into<String>, arguments: Value) -> Self {
        Self {
            action: action.into(),
            arguments,
        }
    }

    /// Interpret an extracted JSON object as zero or more commands.
    ///
    /// Accepted shapes:
    /// - `{"action": "...", "arguments": {...}}`
    /// - `{"tool": "...", "arguments": {...}}`
    /// - `{"set_structure": {...}, "get_project_data": {}}`
    ///
    /// A keyed block is recognised when at least one key is a known action.
    /// Every entry then becomes a command; malformed values are left for the
    /// dispatcher to reject.
    #[must_use]
    pub fn from_block(block: Value) -> Vec<Self> {
        let Value::Object(mut map) = block else {
            tracing::warn!("Ignoring non-object command block");
            return Vec::new();
        };

        for key in ["action", "tool"] {
            if let Some(action) = map.get(key).and_then(Value::as_str) {
                let action = action.to_string();
                let arguments = or_empty(map.remove("arguments"));
                return vec![Self::new(action, arguments)];
            }
        }

        if map.keys().any(|key| ActionKind::parse(key).is_some()) {
            return map
                .into_iter()
                .map(|(action, arguments)| Self::new(action, or_empty(Some(arguments))))
                .collect();
        }

        tracing::warn!(keys = ?map.keys().collect::<Vec<_>>(), "Unrecognised command block");
        Vec::new()
    }

    /// The known action kind, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ActionKind> {
        ActionKind::parse(&self.action)
    }
}

/// Rewrite the accepted argument shapes for `kind` into the canonical one.
///
/// `{"structure": {"name", "fields", ..}}` becomes `{"name", "fields"}` and
/// `{"message": {"name", "payload", ..}}` becomes `{"name", "payload"}`.
/// Anything else is returned unchanged; validation happens downstream.
#[must_use]
pub fn normalize_arguments(kind: ActionKind, arguments: Value) -> Value {
    match kind {
        ActionKind::SetStructure => flatten(arguments, "structure", ["name", "fields"]),
        ActionKind::SetMessage => flatten(arguments, "message", ["name", "payload"]),
        ActionKind::GetProjectData => arguments,
    }
}

fn flatten(arguments: Value, wrapper: &str, keys: [&str; 2]) -> Value {
    let Some(nested) = arguments.get(wrapper).and_then(Value::as_object) else {
        return arguments;
    };
    if !keys.iter().all(|key| nested.contains_key(*key)) {
        return arguments;
    }

    let flat: Map<String, Value> = keys
        .iter()
        .map(|key| ((*key).to_string(), nested[*key].clone()))
        .collect();
    Value::Object(flat)
}
