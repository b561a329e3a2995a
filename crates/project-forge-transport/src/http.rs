//! HTTP routes for the project service.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use project_forge_core::{
    ProjectData, Session, schema,
    traits::{ProjectStorage, SessionStorage, StoreError},
};
use project_forge_executor::{
    CommandDispatcher, CommandOutcome, DispatchError, InstructionError, InstructionReport,
    InstructionRunner, LlmClient,
};
use project_forge_session::ProjectService;
use serde_json::Value;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::protocol::{
    CommandsRequest, CommandsResponse, ErrorBody, HealthResponse, InstructRequest, SessionQuery,
    SetMessageRequest, SetStructureRequest, StartSessionRequest,
};

/// Shared handler state.
pub struct AppState<S>
where
    S: SessionStorage + ProjectStorage,
{
    /// Dispatcher wrapping the project service.
    pub dispatcher: CommandDispatcher<S>,
    /// Model used by `/instruct`, if any.
    pub llm: Option<Arc<dyn LlmClient>>,
}

impl<S> Clone for AppState<S>
where
    S: SessionStorage + ProjectStorage,
{
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
            llm: self.llm.clone(),
        }
    }
}

impl<S> AppState<S>
where
    S: SessionStorage + ProjectStorage,
{
    /// Create state over a shared service without a model.
    #[must_use]
    pub const fn new(service: Arc<ProjectService<S>>) -> Self {
        Self {
            dispatcher: CommandDispatcher::new(service),
            llm: None,
        }
    }

    /// Enable `/instruct` with the given model.
    #[must_use]
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    fn service(&self) -> &ProjectService<S> {
        self.dispatcher.service()
    }
}

/// API error, rendered as `{"detail": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Instruction(#[from] InstructionError),
    #[error("No language model configured")]
    NoModel,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Store(e)
            | Self::Dispatch(DispatchError::Store(e))
            | Self::Instruction(InstructionError::Dispatch(DispatchError::Store(e))) => {
                store_status(e)
            }
            Self::Dispatch(DispatchError::InvalidArguments { .. })
            | Self::Instruction(InstructionError::Dispatch(DispatchError::InvalidArguments {
                ..
            })) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Instruction(InstructionError::Llm(_)) => StatusCode::BAD_GATEWAY,
            Self::NoModel => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

const fn store_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::InvalidSession(_) => StatusCode::UNAUTHORIZED,
        e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        } else {
            tracing::debug!("Request rejected: {self}");
        }
        (
            status,
            Json(ErrorBody {
                detail: self.to_string(),
            }),
        )
            .into_response()
    }
}

async fn get_session<S>(
    State(state): State<AppState<S>>,
    Json(body): Json<StartSessionRequest>,
) -> Result<Json<Session>, ApiError>
where
    S: SessionStorage + ProjectStorage + 'static,
{
    Ok(Json(state.service().create_session(&body.project_name).await?))
}

async fn get_schema() -> Json<Value> {
    Json(schema::describe())
}

async fn set_structure<S>(
    State(state): State<AppState<S>>,
    Json(body): Json<SetStructureRequest>,
) -> Result<Json<CommandOutcome>, ApiError>
where
    S: SessionStorage + ProjectStorage + 'static,
{
    let registration = state
        .service()
        .set_structure(&body.session_key, body.structure)
        .await?;
    Ok(Json(CommandOutcome::structure_set(registration)))
}

async fn set_message<S>(
    State(state): State<AppState<S>>,
    Json(body): Json<SetMessageRequest>,
) -> Result<Json<CommandOutcome>, ApiError>
where
    S: SessionStorage + ProjectStorage + 'static,
{
    let registration = state
        .service()
        .set_message(&body.session_key, body.message)
        .await?;
    Ok(Json(CommandOutcome::message_set(registration)))
}

async fn get_project_data<S>(
    State(state): State<AppState<S>>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<ProjectData>, ApiError>
where
    S: SessionStorage + ProjectStorage + 'static,
{
    Ok(Json(state.service().get_project_data(&query.session_key).await?))
}

async fn commands<S>(
    State(state): State<AppState<S>>,
    Json(body): Json<CommandsRequest>,
) -> Result<Json<CommandsResponse>, ApiError>
where
    S: SessionStorage + ProjectStorage + 'static,
{
    let results = state
        .dispatcher
        .dispatch_text(&body.text, &body.session_key)
        .await?;
    Ok(Json(CommandsResponse { results }))
}

async fn instruct<S>(
    State(state): State<AppState<S>>,
    Json(body): Json<InstructRequest>,
) -> Result<Json<InstructionReport>, ApiError>
where
    S: SessionStorage + ProjectStorage + 'static,
{
    let llm = state.llm.clone().ok_or(ApiError::NoModel)?;
    let runner = InstructionRunner::new(state.dispatcher.clone(), llm);
    Ok(Json(runner.run(&body.instruction, &body.session_key).await?))
}

async fn health<S>(State(state): State<AppState<S>>) -> Result<Json<HealthResponse>, ApiError>
where
    S: SessionStorage + ProjectStorage + 'static,
{
    Ok(Json(state.service().stats().await?.into()))
}

/// Create the HTTP router.
///
/// # Example
/// ```ignore
/// let service = Arc::new(ProjectService::new(MemoryStorage::new()));
/// let app = create_router(AppState::new(service));
/// ```
#[must_use]
pub fn create_router<S>(state: AppState<S>) -> Router
where
    S: SessionStorage + ProjectStorage + 'static,
{
    Router::new()
        .route("/get_session", post(get_session::<S>))
        .route("/get_schema", get(get_schema))
        .route("/set_structure", post(set_structure::<S>))
        .route("/set_message", post(set_message::<S>))
        .route("/get_project_data", get(get_project_data::<S>))
        .route("/commands", post(commands::<S>))
        .route("/instruct", post(instruct::<S>))
        .route("/_health", get(health::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
