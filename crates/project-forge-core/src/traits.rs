//! Core traits for session and project storage.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::{Message, ProjectData, Structure};

/// Opaque session token.
pub type SessionToken = String;

/// Store error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Invalid or expired session_key: {0}")]
    InvalidSession(SessionToken),
    #[error("Project name must not be empty")]
    InvalidProjectName,
    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },
    #[error("Structure '{structure}' has duplicate field names: {}", names.join(", "))]
    DuplicateFieldName {
        structure: String,
        names: Vec<String>,
    },
    #[error("Message '{message}' references structure '{structure}' which is not found in project")]
    UnknownStructureReference { message: String, structure: String },
    #[error("Storage error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether the error is a rejected registration rather than a lookup or
    /// backend failure.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidProjectName
                | Self::EmptyName { .. }
                | Self::DuplicateFieldName { .. }
                | Self::UnknownStructureReference { .. }
        )
    }
}

/// Object counts for health reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub projects_count: usize,
    pub sessions_count: usize,
}

/// Trait for session storage backends.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Bind a fresh token to `project_name`.
    ///
    /// Does not create the project; callers pair this with
    /// [`ProjectStorage::ensure_project`].
    async fn create_session(&self, project_name: &str) -> Result<SessionToken, StoreError>;

    /// Resolve a token to its project name.
    async fn resolve(&self, token: &str) -> Result<String, StoreError>;
}

/// Trait for project storage backends.
#[async_trait]
pub trait ProjectStorage: Send + Sync {
    /// Create an empty project if absent.
    async fn ensure_project(&self, project_name: &str) -> Result<(), StoreError>;

    /// Validate and insert or replace a structure. Returns its name.
    async fn set_structure(
        &self,
        project_name: &str,
        structure: Structure,
    ) -> Result<String, StoreError>;

    /// Validate and insert or replace a message. Returns its name.
    async fn set_message(&self, project_name: &str, message: Message)
    -> Result<String, StoreError>;

    /// Snapshot of a project's structures and messages.
    async fn get_project_data(&self, project_name: &str) -> Result<ProjectData, StoreError>;

    /// Object counts.
    async fn stats(&self) -> Result<StoreStats, StoreError>;
}
