//! Routing of commands to the project service.

use std::sync::Arc;

use project_forge_core::{
    Message, ProjectData, Structure,
    traits::{ProjectStorage, SessionStorage, StoreError},
};
use project_forge_session::{ProjectService, Registration};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::command::{ActionKind, Command, normalize_arguments};
use crate::extract::CommandBlocks;

/// Dispatch error for a single command.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Invalid arguments for {action}: {reason}")]
    InvalidArguments { action: String, reason: String },
}

/// Result of applying one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandOutcome {
    /// A structure was added or replaced.
    StructureSet {
        status: &'static str,
        project: String,
        structure_added_or_replaced: String,
    },
    /// A message was added or replaced.
    MessageSet {
        status: &'static str,
        project: String,
        message_added_or_replaced: String,
    },
    /// Current project snapshot.
    ProjectData(ProjectData),
    /// The action is not recognised. Reported as data, never as a failure.
    UnknownAction { error: String, action: String },
}

impl CommandOutcome {
    /// Outcome for a stored structure.
    #[must_use]
    pub fn structure_set(registration: Registration) -> Self {
        Self::StructureSet {
            status: "ok",
            project: registration.project,
            structure_added_or_replaced: registration.name,
        }
    }

    #[must_use]
    pub fn message_set(registration: Registration) -> Self {
        Self::MessageSet {
            status: "ok",
            project: registration.project,
            message_added_or_replaced: registration.name,
        }
    }

    /// `{"error": "unknown action", "action": ...}`
    #[must_use]
    pub fn unknown_action(action: &str) -> Self {
        Self::UnknownAction {
            error: "unknown action".to_string(),
            action: action.to_string(),
        }
    }
}

/// Per-command entry of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandReport {
    /// Action as emitted.
    pub action: String,
    /// Outcome or error message.
    #[serde(flatten)]
    pub status: ReportStatus,
}

/// Whether a batch entry was applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Result(CommandOutcome),
    Error(String),
}

impl CommandReport {
    /// Whether the command was applied (unknown actions count as applied).
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self.status, ReportStatus::Result(_))
    }
}

/// Routes `(action, arguments, session_token)` triples to the project service.
pub struct CommandDispatcher<S>
where
    S: SessionStorage + ProjectStorage,
{
    service: Arc<ProjectService<S>>,
}

impl<S> Clone for CommandDispatcher<S>
where
    S: SessionStorage + ProjectStorage,
{
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S> CommandDispatcher<S>
where
    S: SessionStorage + ProjectStorage,
{
    /// Create a new dispatcher over a shared service.
    #[must_use]
    pub const fn new(service: Arc<ProjectService<S>>) -> Self {
        Self { service }
    }

    /// The underlying service.
    #[must_use]
    pub fn service(&self) -> &ProjectService<S> {
        &self.service
    }

    /// Apply a single action.
    ///
    /// # Errors
    /// Returns `InvalidSession` when the token cannot be resolved, validation
    /// errors from the registry, or `InvalidArguments` when the arguments do
    /// not match the action's canonical shape. Unknown actions are not errors.
    pub async fn dispatch(
        &self,
        action: &str,
        arguments: Value,
        token: &str,
    ) -> Result<CommandOutcome, DispatchError> {
        let project = self.service.resolve(token).await?;
        self.apply(&project, action, arguments).await
    }

    /// Extract every command block from `text` and apply them in order.
    ///
    /// Each command succeeds or fails on its own; one failure does not roll
    /// back or stop the rest.
    ///
    /// # Errors
    /// Returns `InvalidSession` before applying anything when the token
    /// cannot be resolved.
    pub async fn dispatch_text(
        &self,
        text: &str,
        token: &str,
    ) -> Result<Vec<CommandReport>, DispatchError> {
        let commands: Vec<Command> = CommandBlocks::new(text)
            .flat_map(Command::from_block)
            .collect();
        self.dispatch_all(commands, token).await
    }

    /// Apply a batch of commands in order.
    ///
    /// # Errors
    /// Returns `InvalidSession` before applying anything when the token
    /// cannot be resolved.
    pub async fn dispatch_all(
        &self,
        commands: Vec<Command>,
        token: &str,
    ) -> Result<Vec<CommandReport>, DispatchError> {
        let project = self.service.resolve(token).await?;

        let mut reports = Vec::with_capacity(commands.len());
        for Command { action, arguments } in commands {
            let status = match self.apply(&project, &action, arguments).await {
                Ok(outcome) => ReportStatus::Result(outcome),
                Err(e) => {
                    tracing::warn!(action = %action, error = %e, "Command failed");
                    ReportStatus::Error(e.to_string())
                }
            };
            reports.push(CommandReport { action, status });
        }
        Ok(reports)
    }

    async fn apply(
        &self,
        project: &str,
        action: &str,
        arguments: Value,
    ) -> Result<CommandOutcome, DispatchError> {
        let Some(kind) = ActionKind::parse(action) else {
            tracing::warn!(action = %action, "Unknown action");
            return Ok(CommandOutcome::unknown_action(action));
        };

        let arguments = normalize_arguments(kind, arguments);
        match kind {
            ActionKind::SetStructure => {
                let structure: Structure = parse_arguments(kind, arguments)?;
                let registration = self.service.apply_structure(project, structure).await?;
                Ok(CommandOutcome::structure_set(registration))
            }
            ActionKind::SetMessage => {
                let message: Message = parse_arguments(kind, arguments)?;
                let registration = self.service.apply_message(project, message).await?;
                Ok(CommandOutcome::message_set(registration))
            }
            ActionKind::GetProjectData => {
                let data = self.service.project_data(project).await?;
                Ok(CommandOutcome::ProjectData(data))
            }
        }
    }
}

fn parse_arguments<T: DeserializeOwned>(
    kind: ActionKind,
    arguments: Value,
) -> Result<T, DispatchError> {
    serde_json::from_value(arguments).map_err(|e| DispatchError::InvalidArguments {
        action: kind.as_str().to_string(),
        reason: e.to_string(),
    })
}
