//! Command pipeline for project-forge.
//!
//! Turns free-form model output into validated registry operations:
//! - `extract` - Pull every complete JSON object out of noisy text
//! - `command` - Recognise command blocks and canonicalise their arguments
//! - `dispatch` - Route commands to the project service
//! - `llm` / `runner` - Ask a language model to translate instructions

pub mod command;
pub mod dispatch;
pub mod extract;
pub mod llm;
pub mod runner;

pub use command::{ActionKind, Command, normalize_arguments};
pub use dispatch::{CommandDispatcher, CommandOutcome, CommandReport, DispatchError, ReportStatus};
pub use extract::{CommandBlocks, extract_commands};
pub use llm::{LlmClient, LlmError, LlmRequest, ScriptedLlmClient};
pub use runner::{InstructionError, InstructionReport, InstructionRunner};
