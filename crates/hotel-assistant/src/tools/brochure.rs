use std::sync::Arc;

use hotel_assistant_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::{Value, json};

use super::execution_error;
use crate::rag::RagPipeline;

/// Parameters of [`BrochureTool`].
#[derive(Debug, Deserialize, JsonSchema)]
pub struct BrochureParameters {
    #[schemars(
        description = "The query to use in the search. Infer this from the \
                       user's message. It should be a question or a statement"
    )]
    query: String,
}

/// A tool that answers questions from the hotel brochure.
pub struct BrochureTool {
    rag: Arc<RagPipeline>,
    parameter_schema: Value,
}

impl BrochureTool {
    /// Creates a new tool backed by `rag`.
    #[inline]
    pub fn new(rag: Arc<RagPipeline>) -> Self {
        Self {
            rag,
            parameter_schema: schema_for!(BrochureParameters).to_value(),
        }
    }
}

impl Tool for BrochureTool {
    type Input = BrochureParameters;

    fn name(&self) -> &str {
        "rag_pipeline_func"
    }

    fn description(&self) -> &str {
        "Get information from hotel brochure"
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    #[allow(clippy::manual_async_fn)]
    fn execute(
        &self,
        input: BrochureParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let rag = Arc::clone(&self.rag);
        async move {
            let reply =
                rag.answer(&input.query).await.map_err(execution_error)?;
            Ok(json!({ "reply": reply }))
        }
    }
}
