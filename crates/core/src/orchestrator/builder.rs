use hotel_assistant_model::ModelProvider;

use super::{DEFAULT_MAX_TOOL_ROUNDS, Orchestrator};
use crate::model_client::ModelClient;
use crate::tool::{AnyTool, Executor as ToolExecutor, Tool, ToolObject};

/// [`Orchestrator`] builder.
pub struct OrchestratorBuilder {
    model_client: ModelClient,
    tools: Vec<Box<dyn ToolObject>>,
    max_tool_rounds: usize,
}

impl OrchestratorBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self::with_model_client(ModelClient::new(provider))
    }

    /// Creates a new builder over an existing model client, which can be
    /// shared with other components.
    #[inline]
    pub fn with_model_client(model_client: ModelClient) -> Self {
        Self {
            model_client,
            tools: vec![],
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Registers a tool.
    ///
    /// Tools are declared to the model in registration order. A tool with
    /// the same name as an earlier one replaces it.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        let tool = Box::new(AnyTool(tool));
        self.tools.push(tool);
        self
    }

    /// Sets the maximum number of tool rounds per turn.
    #[inline]
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    /// Builds the orchestrator.
    #[inline]
    pub fn build(self) -> Orchestrator {
        let OrchestratorBuilder {
            model_client,
            tools,
            max_tool_rounds,
        } = self;
        Orchestrator {
            model_client,
            tool_executor: ToolExecutor::with_tools(tools),
            max_tool_rounds,
        }
    }
}
