//! Token-resolving facade over session and project storage.

use project_forge_core::{
    Message, ProjectData, Session, Structure,
    traits::{ProjectStorage, SessionStorage, StoreError, StoreStats},
};
use serde::Serialize;

/// Outcome of a successful structure or message registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// Project the registration was applied to.
    pub project: String,
    /// Name that was added or replaced.
    pub name: String,
}

/// Project service for session-scoped registry operations.
///
/// Every operation except `create_session` takes a session token and
/// fails with `InvalidSession` when it cannot be resolved.
pub struct ProjectService<S>
where
    S: SessionStorage + ProjectStorage,
{
    storage: S,
}

impl<S> ProjectService<S>
where
    S: SessionStorage + ProjectStorage,
{
    /// Create a new project service.
    #[must_use]
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Create a session bound to `project_name`, creating the project if needed.
    ///
    /// # Errors
    /// Returns `InvalidProjectName` for an empty name.
    pub async fn create_session(&self, project_name: &str) -> Result<Session, StoreError> {
        if project_name.trim().is_empty() {
            return Err(StoreError::InvalidProjectName);
        }

        let token = self.storage.create_session(project_name).await?;
        self.storage.ensure_project(project_name).await?;

        tracing::info!(project = %project_name, "Session created");
        Ok(Session {
            token,
            project_name: project_name.to_string(),
        })
    }

    /// Resolve a session token to its project name.
    ///
    /// # Errors
    /// Returns `InvalidSession` if the token is unknown.
    pub async fn resolve(&self, token: &str) -> Result<String, StoreError> {
        self.storage.resolve(token).await
    }

    /// Add or replace a structure in the session's project.
    ///
    /// # Errors
    /// Returns `InvalidSession`, `EmptyName` or `DuplicateFieldName`.
    pub async fn set_structure(
        &self,
        token: &str,
        structure: Structure,
    ) -> Result<Registration, StoreError> {
        let project = self.storage.resolve(token).await?;
        self.apply_structure(&project, structure).await
    }

    /// Add or replace a message in the session's project.
    ///
    /// # Errors
    /// Returns `InvalidSession`, `EmptyName` or `UnknownStructureReference`.
    pub async fn set_message(
        &self,
        token: &str,
        message: Message,
    ) -> Result<Registration, StoreError> {
        let project = self.storage.resolve(token).await?;
        self.apply_message(&project, message).await
    }

    /// Snapshot of the session's project.
    ///
    /// # Errors
    /// Returns `InvalidSession` if the token is unknown.
    pub async fn get_project_data(&self, token: &str) -> Result<ProjectData, StoreError> {
        let project = self.storage.resolve(token).await?;
        self.project_data(&project).await
    }

    /// Add or replace a structure in an already resolved project.
    ///
    /// # Errors
    /// Returns `EmptyName` or `DuplicateFieldName`.
    pub async fn apply_structure(
        &self,
        project: &str,
        structure: Structure,
    ) -> Result<Registration, StoreError> {
        let name = self.storage.set_structure(project, structure).await?;

        tracing::info!(project = %project, structure = %name, "Structure added or replaced");
        Ok(Registration {
            project: project.to_string(),
            name,
        })
    }

    /// Add or replace a message in an already resolved project.
    ///
    /// # Errors
    /// Returns `EmptyName` or `UnknownStructureReference`.
    pub async fn apply_message(
        &self,
        project: &str,
        message: Message,
    ) -> Result<Registration, StoreError> {
        let name = self.storage.set_message(project, message).await?;

        tracing::info!(project = %project, message = %name, "Message added or replaced");
        Ok(Registration {
            project: project.to_string(),
            name,
        })
    }

    /// Snapshot of an already resolved project.
    ///
    /// # Errors
    /// Returns `Internal` on backend failure.
    pub async fn project_data(&self, project: &str) -> Result<ProjectData, StoreError> {
        self.storage.get_project_data(project).await
    }

    /// Object counts for health reporting.
    ///
    /// # Errors
    /// Returns `Internal` on backend failure.
    pub async fn stats(&self) -> Result<StoreStats, StoreError> {
        self.storage.stats().await
    }
}
