//! Natural-language instructions applied through a language model.

use project_forge_core::{
    schema,
    traits::{ProjectStorage, SessionStorage},
};
use serde::Serialize;
use thiserror::Error;

use crate::dispatch::{CommandDispatcher, CommandReport, DispatchError};
use crate::llm::{LlmClient, LlmError, LlmRequest};

/// Instruction error.
#[derive(Debug, Error)]
pub enum InstructionError {
    #[error("Model error: {0}")]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// What happened to one instruction.
#[derive(Debug, Clone, Serialize)]
pub struct InstructionReport {
    /// The instruction as given.
    pub instruction: String,
    /// Unprocessed model output.
    pub raw_output: String,
    /// One entry per command found in the output.
    pub results: Vec<CommandReport>,
}

/// Translates instructions into commands with a model, then dispatches them.
pub struct InstructionRunner<S, C>
where
    S: SessionStorage + ProjectStorage,
    C: LlmClient,
{
    dispatcher: CommandDispatcher<S>,
    client: C,
}

impl<S, C> InstructionRunner<S, C>
where
    S: SessionStorage + ProjectStorage,
    C: LlmClient,
{
    /// Create a new runner.
    #[must_use]
    pub const fn new(dispatcher: CommandDispatcher<S>, client: C) -> Self {
        Self { dispatcher, client }
    }

    /// Ask the model to translate `instruction` and apply every command it emits.
    ///
    /// # Errors
    /// Returns `Llm` when the model call fails and `InvalidSession` when the
    /// token cannot be resolved. Individual command failures are reported in
    /// the returned results.
    pub async fn run(
        &self,
        instruction: &str,
        token: &str,
    ) -> Result<InstructionReport, InstructionError> {
        // Fail fast before paying for a model call.
        self.dispatcher
            .service()
            .resolve(token)
            .await
            .map_err(DispatchError::from)?;

        let raw_output = self.client.complete(build_request(instruction)).await?;
        tracing::debug!(output = %raw_output, "Model output");

        let results = self.dispatcher.dispatch_text(&raw_output, token).await?;
        if results.is_empty() {
            tracing::warn!(instruction = %instruction, "No commands found in model output");
        } else {
            tracing::info!(commands = results.len(), "Instruction applied");
        }

        Ok(InstructionReport {
            instruction: instruction.to_string(),
            raw_output,
            results,
        })
    }
}

/// Prompt asking the model for command blocks.
#[must_use]
pub fn build_request(instruction: &str) -> LlmRequest {
    let system = format!(
        "You are an assistant controlling a project API.\n\
         Here is the schema you MUST follow exactly:\n{schema}\n\n\
         Respond ONLY with one JSON object per action, each shaped like one of:\n{examples}\n\
         Emit several objects when the instruction needs several actions.",
        schema = pretty(&schema::describe()),
        examples = pretty(&schema::command_examples()),
    );
    LlmRequest {
        system,
        user: instruction.to_string(),
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
