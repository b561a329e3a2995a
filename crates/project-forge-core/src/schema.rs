//! Static description of the operation and command shapes.
//!
//! Served by `get_schema` and embedded in model prompts.

use serde_json::{Value, json};

/// Actions understood by the command dispatcher.
pub const ACTIONS: [&str; 3] = ["set_structure", "set_message", "get_project_data"];

/// Describe the request shapes of every operation.
#[must_use]
pub fn describe() -> Value {
    json!({
        "set_structure": {
            "session_key": "string",
            "structure": {
                "name": "string",
                "description": "string (optional)",
                "fields": [
                    {"name": "string", "type": "string", "required": "bool"}
                ]
            }
        },
        "set_message": {
            "session_key": "string",
            "message": {
                "name": "string",
                "payload": [
                    {
                        "structure_name": "string",
                        "type": "string",
                        "values": [{"field": "value"}]
                    }
                ]
            }
        },
        "get_project_data": {
            "session_key": "string"
        }
    })
}

/// Canonical command blocks a model is expected to emit.
#[must_use]
pub fn command_examples() -> Value {
    json!([
        {"action": "set_structure", "arguments": {
            "name": "string",
            "fields": [{"name": "string", "type": "string", "required": "bool"}]
        }},
        {"action": "set_message", "arguments": {"name": "string", "payload": [{}]}},
        {"action": "get_project_data", "arguments": {}}
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_every_action() {
        let schema = describe();
        for action in ACTIONS {
            assert!(schema.get(action).is_some(), "missing {action}");
        }
    }

    #[test]
    fn test_command_examples_are_canonical() {
        let examples = command_examples();
        let actions: Vec<_> = examples
            .as_array()
            .unwrap()
            .iter()
            .map(|block| block["action"].as_str().unwrap())
            .collect();
        assert_eq!(actions, ACTIONS);
    }
}
