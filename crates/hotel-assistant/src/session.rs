use std::sync::Arc;

use hotel_assistant_core::conversation::Conversation;
use hotel_assistant_core::stream::ChunkSender;
use hotel_assistant_core::{
    DEFAULT_MAX_TOOL_ROUNDS, EmbeddingClient, ModelClient, Orchestrator,
    OrchestratorBuilder, TurnError, TurnSummary,
};
use hotel_assistant_inventory::{InventoryBackend, InventoryError};
use thiserror::Error;
use tracing::Instrument;

use crate::rag::{BROCHURE, DEFAULT_TOP_K, RagError, RagPipeline};
use crate::tools::*;

const SYSTEM_PROMPT: &str = include_str!("./system_prompt.md");

/// Renders the hotel system prompt for the given item categories.
pub fn render_system_prompt<S: AsRef<str>>(categories: &[S]) -> String {
    let categories = categories
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");
    SYSTEM_PROMPT.replace("{{CATEGORIES}}", &categories)
}

/// The error type for building a [`Session`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// The item categories could not be fetched.
    #[error("failed to fetch item categories: {0}")]
    Inventory(#[from] InventoryError),

    /// The brochure could not be indexed.
    #[error("failed to index the brochure: {0}")]
    Rag(#[from] RagError),
}

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    model_client: ModelClient,
    embedding_client: EmbeddingClient,
    inventory: Arc<dyn InventoryBackend>,
    max_tool_rounds: usize,
    top_k: usize,
}

impl SessionBuilder {
    /// Creates a session builder from its clients and an inventory.
    ///
    /// The chat client serves both the conversation and brochure answers.
    pub fn new(
        model_client: ModelClient,
        embedding_client: EmbeddingClient,
        inventory: Arc<dyn InventoryBackend>,
    ) -> Self {
        Self {
            model_client,
            embedding_client,
            inventory,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Sets the maximum number of tool rounds per turn.
    #[inline]
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    /// Sets the number of brochure documents retrieved per question.
    #[inline]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Builds a new session.
    ///
    /// This fetches the item categories for the system prompt and embeds
    /// the brochure.
    pub async fn build(self) -> Result<Session, SessionError> {
        let categories = self.inventory.categories().await?;
        debug!("inventory categories: {:?}", categories);

        let rag = RagPipeline::build(
            self.embedding_client,
            self.model_client.clone(),
            BROCHURE,
        )
        .instrument(debug_span!("index brochure"))
        .await?
        .with_top_k(self.top_k);

        let orchestrator =
            OrchestratorBuilder::with_model_client(self.model_client)
                .with_tool(GetItemsTool::new(Arc::clone(&self.inventory)))
                .with_tool(PurchaseItemTool::new(self.inventory))
                .with_tool(BrochureTool::new(Arc::new(rag)))
                .with_max_tool_rounds(self.max_tool_rounds)
                .build();

        let conversation =
            Conversation::with_system_prompt(render_system_prompt(&categories));

        Ok(Session {
            orchestrator,
            conversation,
        })
    }
}

/// A chat session with a hotel guest.
///
/// The session owns the conversation history and drives it through an
/// [`Orchestrator`] equipped with the hotel tools.
pub struct Session {
    orchestrator: Orchestrator,
    conversation: Conversation,
}

impl Session {
    /// Sends a guest message and runs the turn to completion.
    ///
    /// Reply text is streamed to `chunk_tx` as it arrives.
    pub async fn send_message(
        &mut self,
        message: &str,
        chunk_tx: Option<ChunkSender>,
    ) -> Result<TurnSummary, TurnError> {
        self.conversation.push_user(message);
        self.orchestrator
            .run_turn(&mut self.conversation, chunk_tx)
            .await
    }

    /// Returns the conversation so far.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_system_prompt() {
        let prompt =
            render_system_prompt(&["Food and beverages", "Miscellaneous"]);
        assert!(prompt.starts_with(
            "You are an assistant to tourists visiting a hotel.\n"
        ));
        assert!(prompt.contains(
            "(which includes Food and beverages, Miscellaneous) that tourists"
        ));
        assert!(!prompt.contains("{{"));
    }
}
