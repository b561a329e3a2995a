//! In-memory session and project storage.

use std::{
    collections::{BTreeMap, HashMap},
    sync::RwLock,
};

use async_trait::async_trait;
use chrono::Utc;
use project_forge_core::{
    Message, ProjectData, Structure,
    traits::{ProjectStorage, SessionStorage, SessionToken, StoreError, StoreStats},
};
use uuid::Uuid;

use crate::validate::{validate_message, validate_structure};

#[derive(Debug, Default)]
struct Project {
    structures: BTreeMap<String, Structure>,
    messages: BTreeMap<String, Message>,
}

/// In-memory storage implementation.
///
/// Sessions and projects live for the lifetime of the process.
/// Reads run concurrently; writes are exclusive.
pub struct MemoryStorage {
    sessions: RwLock<HashMap<SessionToken, String>>,
    projects: RwLock<HashMap<String, Project>>,
}

impl MemoryStorage {
    /// Create a new in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            projects: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn create_session(&self, project_name: &str) -> Result<SessionToken, StoreError> {
        let token = Uuid::new_v4().to_string();

        self.sessions
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?
            .insert(token.clone(), project_name.to_string());

        Ok(token)
    }

    async fn resolve(&self, token: &str) -> Result<String, StoreError> {
        self.sessions
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?
            .get(token)
            .cloned()
            .ok_or_else(|| StoreError::InvalidSession(token.to_string()))
    }
}

#[async_trait]
impl ProjectStorage for MemoryStorage {
    async fn ensure_project(&self, project_name: &str) -> Result<(), StoreError> {
        self.projects
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?
            .entry(project_name.to_string())
            .or_default();
        Ok(())
    }

    async fn set_structure(
        &self,
        project_name: &str,
        structure: Structure,
    ) -> Result<String, StoreError> {
        validate_structure(&structure)?;

        let mut projects = self
            .projects
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        let name = structure.name.clone();
        projects
            .entry(project_name.to_string())
            .or_default()
            .structures
            .insert(name.clone(), structure);

        Ok(name)
    }

    async fn set_message(
        &self,
        project_name: &str,
        mut message: Message,
    ) -> Result<String, StoreError> {
        let mut projects = self
            .projects
            .write()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        let project = projects.entry(project_name.to_string()).or_default();
        validate_message(&message, &project.structures)?;

        message.created_at.get_or_insert_with(Utc::now);
        let name = message.name.clone();
        project.messages.insert(name.clone(), message);

        Ok(name)
    }

    async fn get_project_data(&self, project_name: &str) -> Result<ProjectData, StoreError> {
        let projects = self
            .projects
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?;

        Ok(projects.get(project_name).map_or_else(
            || ProjectData::empty(project_name),
            |project| ProjectData {
                project_name: project_name.to_string(),
                structures: project.structures.clone(),
                messages: project.messages.clone(),
            },
        ))
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let projects_count = self
            .projects
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?
            .len();
        let sessions_count = self
            .sessions
            .read()
            .map_err(|e| StoreError::Internal(e.to_string()))?
            .len();

        Ok(StoreStats {
            projects_count,
            sessions_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use project_forge_core::Field;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_resolve_unknown_token() {
        let storage = MemoryStorage::new();
        let err = storage.resolve("nope").await.unwrap_err();
        assert_eq!(err, StoreError::InvalidSession("nope".to_string()));
    }

    #[tokio::test]
    async fn test_ensure_project_is_idempotent() {
        let storage = MemoryStorage::new();
        storage
            .set_structure("p", Structure::new("s", vec![Field::new("a", "int")]))
            .await
            .unwrap();
        storage.ensure_project("p").await.unwrap();

        let data = storage.get_project_data("p").await.unwrap();
        assert_eq!(data.structures.len(), 1);
        assert_eq!(storage.stats().await.unwrap().projects_count, 1);
    }

    #[tokio::test]
    async fn test_rejected_structure_leaves_previous_value() {
        let storage = MemoryStorage::new();
        let original = Structure::new("s", vec![Field::new("a", "int")]);
        storage.set_structure("p", original.clone()).await.unwrap();

        let bad = Structure::new("s", vec![Field::new("x", ""), Field::new("x", "")]);
        assert!(storage.set_structure("p", bad).await.is_err());

        let data = storage.get_project_data("p").await.unwrap();
        assert_eq!(data.structures["s"], original);
    }

    #[tokio::test]
    async fn test_message_gets_timestamp() {
        let storage = MemoryStorage::new();
        storage
            .set_message("p", Message::new("m", vec![json!({"a": 1})]))
            .await
            .unwrap();

        let data = storage.get_project_data("p").await.unwrap();
        assert!(data.messages["m"].created_at.is_some());
    }

    #[tokio::test]
    async fn test_message_keeps_given_timestamp() {
        let storage = MemoryStorage::new();
        let created_at: DateTime<Utc> = "2024-01-02T03:04:05Z".parse().unwrap();
        let message = Message {
            created_at: Some(created_at),
            ..Message::new("m", vec![])
        };
        storage.set_message("p", message).await.unwrap();

        let data = storage.get_project_data("p").await.unwrap();
        assert_eq!(data.messages["m"].created_at, Some(created_at));
    }

    #[tokio::test]
    async fn test_unknown_project_snapshot_is_empty() {
        let storage = MemoryStorage::new();
        let data = storage.get_project_data("missing").await.unwrap();
        assert_eq!(data, ProjectData::empty("missing"));
    }

    #[test]
    fn test_projects_are_isolated() {
        tokio_test::block_on(async {
            let storage = MemoryStorage::new();
            storage
                .set_structure("a", Structure::new("s", vec![]))
                .await
                .unwrap();

            let err = storage
                .set_message("b", Message::new("m", vec![json!({"structure_name": "s"})]))
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::UnknownStructureReference { .. }));
        });
    }
}
