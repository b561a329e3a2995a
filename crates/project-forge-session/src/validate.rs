//! Registration-time validation.

use std::collections::{BTreeMap, HashMap};

use project_forge_core::{Message, Structure, StoreError};
use serde_json::Value;

/// Check that every field name of `structure` is unique.
///
/// Names are compared exactly (case-sensitive). Type tags are not inspected.
///
/// # Errors
/// Returns `EmptyName` for an unnamed structure and `DuplicateFieldName`
/// listing each repeated name once, in order of first occurrence.
pub fn validate_structure(structure: &Structure) -> Result<(), StoreError> {
    if structure.name.is_empty() {
        return Err(StoreError::EmptyName { kind: "Structure" });
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in structure.field_names() {
        *counts.entry(name).or_default() += 1;
    }

    let mut duplicates: Vec<String> = Vec::new();
    for name in structure.field_names() {
        if counts[name] > 1 && !duplicates.iter().any(|d| d == name) {
            duplicates.push(name.to_string());
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(StoreError::DuplicateFieldName {
            structure: structure.name.clone(),
            names: duplicates,
        })
    }
}

/// Check that every structure referenced by `message` exists in `structures`.
///
/// Only reference existence is checked; payload contents are not matched
/// against the referenced structure's fields.
///
/// # Errors
/// Returns `EmptyName` for an unnamed message and
/// `UnknownStructureReference` for the first missing reference.
pub fn validate_message(
    message: &Message,
    structures: &BTreeMap<String, Structure>,
) -> Result<(), StoreError> {
    if message.name.is_empty() {
        return Err(StoreError::EmptyName { kind: "Message" });
    }

    for reference in message.structure_refs() {
        let known = reference
            .as_str()
            .is_some_and(|name| structures.contains_key(name));
        if !known {
            return Err(StoreError::UnknownStructureReference {
                message: message.name.clone(),
                structure: render(reference),
            });
        }
    }
    Ok(())
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use project_forge_core::Field;
    use serde_json::json;

    use super::*;

    fn user_profile() -> Structure {
        Structure::new(
            "user_profile",
            vec![
                Field::new("username", "string").required(),
                Field::new("age", "int"),
            ],
        )
    }

    #[test]
    fn test_unique_fields_pass() {
        assert!(validate_structure(&user_profile()).is_ok());
    }

    #[test]
    fn test_empty_structure_passes() {
        assert!(validate_structure(&Structure::new("empty", vec![])).is_ok());
    }

    #[test]
    fn test_duplicate_fields_rejected() {
        let structure = Structure::new(
            "user_profile",
            vec![
                Field::new("x", ""),
                Field::new("y", ""),
                Field::new("x", ""),
                Field::new("x", ""),
                Field::new("y", ""),
            ],
        );
        let err = validate_structure(&structure).unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateFieldName {
                structure: "user_profile".to_string(),
                names: vec!["x".to_string(), "y".to_string()],
            }
        );
    }

    #[test]
    fn test_field_names_are_case_sensitive() {
        let structure = Structure::new(
            "s",
            vec![Field::new("Name", "string"), Field::new("name", "string")],
        );
        assert!(validate_structure(&structure).is_ok());
    }

    #[test]
    fn test_duplicates_listed_in_first_occurrence_order() {
        let structure = Structure::new(
            "s",
            ["a", "b", "b", "a"]
                .into_iter()
                .map(|name| Field::new(name, "int"))
                .collect(),
        );
        let err = validate_structure(&structure).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateFieldName { ref names, .. } if names == &["a", "b"]));
    }

    #[test]
    fn test_unnamed_structure_rejected() {
        let err = validate_structure(&Structure::new("", vec![])).unwrap_err();
        assert_eq!(err, StoreError::EmptyName { kind: "Structure" });
    }

    #[test]
    fn test_blank_names_are_names() {
        assert!(validate_structure(&Structure::new(" ", vec![])).is_ok());

        let err = validate_message(&Message::new("", vec![]), &BTreeMap::new()).unwrap_err();
        assert_eq!(err, StoreError::EmptyName { kind: "Message" });
        assert!(validate_message(&Message::new(" ", vec![]), &BTreeMap::new()).is_ok());
    }

    #[test]
    fn test_message_reference_must_exist() {
        let mut structures = BTreeMap::new();
        structures.insert("user_profile".to_string(), user_profile());

        let ok = Message::new(
            "jane",
            vec![json!({"structure_name": "user_profile", "username": "jane"})],
        );
        assert!(validate_message(&ok, &structures).is_ok());

        let ghost = Message::new("m1", vec![json!({"structure_name": "ghost"})]);
        assert_eq!(
            validate_message(&ghost, &structures).unwrap_err(),
            StoreError::UnknownStructureReference {
                message: "m1".to_string(),
                structure: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_records_without_reference_pass() {
        let message = Message::new(
            "free",
            vec![json!({"text": "hello"}), json!(42), json!({"structure_name": null})],
        );
        assert!(validate_message(&message, &BTreeMap::new()).is_ok());
    }

    #[test]
    fn test_non_string_reference_rejected() {
        let message = Message::new("m", vec![json!({"structure_name": 3})]);
        let err = validate_message(&message, &BTreeMap::new()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnknownStructureReference { ref structure, .. } if structure == "3"
        ));
    }

    #[test]
    fn test_payload_fields_not_checked_against_structure() {
        let mut structures = BTreeMap::new();
        structures.insert("user_profile".to_string(), user_profile());
        let message = Message::new(
            "loose",
            vec![json!({"structure_name": "user_profile", "unrelated": true})],
        );
        assert!(validate_message(&message, &structures).is_ok());
    }
}
