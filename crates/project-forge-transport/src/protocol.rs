//! Wire protocol for client-server communication.

use project_forge_core::{Message, Structure, traits::StoreStats};
use project_forge_executor::CommandReport;
use serde::{Deserialize, Serialize};

/// Body of `POST /get_session`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub project_name: String,
}

/// Body of `POST /set_structure`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStructureRequest {
    pub session_key: String,
    pub structure: Structure,
}

/// Body of `POST /set_message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetMessageRequest {
    pub session_key: String,
    pub message: Message,
}

/// Query of `GET /get_project_data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionQuery {
    pub session_key: String,
}

/// Body of `POST /commands`: raw text holding one or more command blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsRequest {
    pub session_key: String,
    pub text: String,
}

/// Response of `POST /commands`.
#[derive(Debug, Clone, Serialize)]
pub struct CommandsResponse {
    pub results: Vec<CommandReport>,
}

/// Body of `POST /instruct`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructRequest {
    pub session_key: String,
    pub instruction: String,
}

/// Response of `GET /_health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub projects_count: usize,
    pub sessions_count: usize,
}

impl From<StoreStats> for HealthResponse {
    fn from(stats: StoreStats) -> Self {
        Self {
            status: "ok".to_string(),
            projects_count: stats.projects_count,
            sessions_count: stats.sessions_count,
        }
    }
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub detail: String,
}
