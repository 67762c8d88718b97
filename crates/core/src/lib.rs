//! Core logic including the tool-calling loop, tool execution, model
//! clients and streaming.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod conversation;
mod embedding_client;
mod model_client;
mod orchestrator;
pub mod stream;
pub mod tool;

pub use embedding_client::EmbeddingClient;
pub use model_client::{ModelClient, ModelClientResponse, RetryPolicy};
pub use orchestrator::{
    DEFAULT_MAX_TOOL_ROUNDS, Orchestrator, OrchestratorBuilder,
    ROUND_LIMIT_REPLY, TurnError, TurnStop, TurnSummary,
};
