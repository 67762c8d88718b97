mod builder;

use hotel_assistant_model::{
    ModelFinishReason, ModelProviderError, ModelRequest,
};
use tracing::Instrument;

use crate::conversation::{Conversation, Role};
use crate::model_client::ModelClient;
use crate::stream::{ChunkSender, StreamChunk};
use crate::tool::Executor as ToolExecutor;
pub use builder::OrchestratorBuilder;

/// The number of tool rounds a turn may run by default.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 10;

/// The reply appended when a turn runs out of tool rounds.
pub const ROUND_LIMIT_REPLY: &str = "I'm sorry, I was unable to complete \
    your request. Please contact the hotel staff for help.";

/// Drives the model through tool calls until it produces a reply.
///
/// An orchestrator holds no conversation state. Each call to
/// [`Orchestrator::run_turn`] borrows the caller's [`Conversation`] and
/// appends to it, so one orchestrator can serve any number of sessions.
pub struct Orchestrator {
    model_client: ModelClient,
    tool_executor: ToolExecutor,
    max_tool_rounds: usize,
}

/// How a turn ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TurnStop {
    /// The model replied and the reply was appended.
    Replied,
    /// The model replied right after a system message. The reply was
    /// streamed but not appended.
    Suppressed,
    /// The model kept asking for tools past the round limit, and a
    /// fallback reply was appended after any text of the last response.
    RoundLimit,
}

/// A summary of a finished turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TurnSummary {
    /// The number of tool rounds executed.
    pub tool_rounds: usize,
    /// How the turn ended.
    pub stop: TurnStop,
}

/// The error type for a failed turn.
///
/// Tool failures never fail a turn, only the chat model can.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// The chat model request failed, after retries where applicable.
    #[error("model request failed: {0}")]
    Model(Box<dyn ModelProviderError>),
}

impl Orchestrator {
    /// Returns the model client used by this orchestrator.
    #[inline]
    pub fn model_client(&self) -> &ModelClient {
        &self.model_client
    }

    /// Returns the maximum number of tool rounds per turn.
    #[inline]
    pub fn max_tool_rounds(&self) -> usize {
        self.max_tool_rounds
    }

    /// Runs one turn over `conversation`, which normally ends with the
    /// guest's message.
    ///
    /// Text produced by the model is forwarded to `chunk_tx` as it streams
    /// in. The sender is dropped when the turn ends, which closes the
    /// channel.
    ///
    /// On error, the conversation keeps every message appended before the
    /// failure.
    pub async fn run_turn(
        &self,
        conversation: &mut Conversation,
        chunk_tx: Option<ChunkSender>,
    ) -> Result<TurnSummary, TurnError> {
        self.run_turn_inner(conversation, chunk_tx)
            .instrument(debug_span!("turn"))
            .await
    }

    async fn run_turn_inner(
        &self,
        conversation: &mut Conversation,
        chunk_tx: Option<ChunkSender>,
    ) -> Result<TurnSummary, TurnError> {
        let tools = self.tool_executor.definitions();
        let mut tool_rounds = 0;
        loop {
            let request = ModelRequest {
                messages: conversation.messages(),
                tools: tools.clone(),
            };
            let resp = self
                .model_client
                .send_request(request, chunk_tx.clone())
                .await
                .map_err(TurnError::Model)?;

            // The finish reason decides. Calls that come with a plain stop
            // are ignored.
            let wants_tools = resp.finish_reason
                != Some(ModelFinishReason::Stop)
                && !resp.tool_calls.is_empty();
            if !wants_tools {
                if !resp.tool_calls.is_empty() {
                    warn!("ignoring tool calls in a finished response");
                }
                let stop = if conversation.last_role() == Some(Role::System) {
                    debug!("reply follows a system message, not appending");
                    TurnStop::Suppressed
                } else {
                    conversation.push_assistant(resp.transcript);
                    TurnStop::Replied
                };
                return Ok(TurnSummary { tool_rounds, stop });
            }

            if tool_rounds >= self.max_tool_rounds {
                warn!("tool round limit ({}) reached", self.max_tool_rounds);
                // Text of the capped response has already been streamed, so
                // the reply continues it after a blank line.
                let ending = if resp.transcript.is_empty() {
                    ROUND_LIMIT_REPLY.to_owned()
                } else {
                    format!("\n\n{ROUND_LIMIT_REPLY}")
                };
                if let Some(tx) = &chunk_tx {
                    tx.send(StreamChunk::text(ending.clone())).ok();
                }
                conversation.push_assistant(resp.transcript + &ending);
                return Ok(TurnSummary {
                    tool_rounds,
                    stop: TurnStop::RoundLimit,
                });
            }

            tool_rounds += 1;
            debug!(
                "tool round {tool_rounds}: {} call(s)",
                resp.tool_calls.len()
            );
            let calls = resp.tool_calls.clone();
            conversation.push_tool_request(resp.transcript, resp.tool_calls);
            for call in &calls {
                let result = self.tool_executor.handle_request(call).await;
                conversation.push_tool_result(result);
            }
        }
    }
}
