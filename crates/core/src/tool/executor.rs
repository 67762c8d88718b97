use std::collections::HashMap;
use std::future::ready;

use hotel_assistant_model::{ModelTool, ToolCallRequest, ToolCallResult};
use tracing::Instrument;

use crate::tool::{BoxedToolFuture, Error, ToolObject};

/// An executor that handles tool call requests from the model.
///
/// Tools keep their registration order, which is the order they are
/// declared to the model.
pub struct Executor {
    order: Vec<String>,
    tools: HashMap<String, Box<dyn ToolObject>>,
}

impl Executor {
    pub fn with_tools(tools: Vec<Box<dyn ToolObject>>) -> Self {
        let mut order = Vec::with_capacity(tools.len());
        let mut tool_map = HashMap::with_capacity(tools.len());
        for tool in tools {
            let name = tool.name().to_owned();
            if tool_map.contains_key(&name) {
                warn!("tool `{name}` registered twice, keeping the last one");
            } else {
                order.push(name.clone());
            }
            tool_map.insert(name, tool);
        }
        Self {
            order,
            tools: tool_map,
        }
    }

    #[inline]
    pub fn definitions(&self) -> Vec<ModelTool> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    /// Executes one request and serializes its outcome.
    ///
    /// Failures are turned into error payloads, so the returned result is
    /// always something that can be sent back to the model.
    pub fn handle_request(
        &self,
        req: &ToolCallRequest,
    ) -> impl Future<Output = ToolCallResult> + Send + 'static {
        let fut: BoxedToolFuture = match self.tools.get(&req.name) {
            Some(tool) => {
                trace!(
                    "executing {} ({}): {}",
                    req.name, req.id, req.arguments
                );
                tool.execute(req.arguments.clone())
            }
            None => {
                warn!("tool not found: {}", req.name);
                Box::pin(ready(Err(Error::unknown_tool(&req.name))))
            }
        };

        let id = req.id.clone();
        let name = req.name.clone();
        let span = debug_span!("tool execute", tool = %name);
        async move {
            let value = match fut.await {
                Ok(value) => value,
                Err(err) => {
                    warn!("tool call failed: {err}");
                    err.to_payload()
                }
            };
            ToolCallResult {
                id,
                name,
                content: value.to_string(),
            }
        }
        .instrument(span)
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use serde::Deserialize;
    use serde_json::{Value, json};

    use super::*;
    use crate::tool::{AnyTool, Tool, ToolResult};

    #[derive(Deserialize)]
    struct EchoInput {
        text: String,
    }

    struct EchoTool {
        schema: Value,
    }

    impl EchoTool {
        fn new() -> Self {
            Self {
                schema: json!({
                    "type": "object",
                    "properties": { "text": { "type": "string" } },
                    "required": ["text"]
                }),
            }
        }
    }

    impl Tool for EchoTool {
        type Input = EchoInput;

        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes the text back"
        }

        fn parameter_schema(&self) -> &Value {
            &self.schema
        }

        fn execute(
            &self,
            input: Self::Input,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            let result = if input.text.is_empty() {
                Err(Error::execution_error().with_reason("nothing to echo"))
            } else {
                Ok(json!({ "echo": input.text }))
            };
            ready(result)
        }
    }

    fn request(name: &str, arguments: Value) -> ToolCallRequest {
        ToolCallRequest {
            id: "call_1".to_owned(),
            name: name.to_owned(),
            arguments,
        }
    }

    fn payload(result: &ToolCallResult) -> Value {
        serde_json::from_str(&result.content).unwrap()
    }

    #[test]
    fn test_definitions() {
        let executor =
            Executor::with_tools(vec![Box::new(AnyTool(EchoTool::new()))]);
        let definitions = executor.definitions();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].name, "echo");
        assert_eq!(definitions[0].description, "Echoes the text back");
        assert_eq!(definitions[0].parameters["required"], json!(["text"]));
    }

    #[tokio::test]
    async fn test_handle_request() {
        let executor =
            Executor::with_tools(vec![Box::new(AnyTool(EchoTool::new()))]);

        let result = executor
            .handle_request(&request("echo", json!({ "text": "hi" })))
            .await;
        assert_eq!(result.id, "call_1");
        assert_eq!(result.name, "echo");
        assert_eq!(payload(&result), json!({ "echo": "hi" }));

        let result = executor
            .handle_request(&request("echo", json!({ "text": "" })))
            .await;
        assert_eq!(
            payload(&result),
            json!({
                "error": "execution_error",
                "message": "nothing to echo",
            })
        );
    }

    #[tokio::test]
    async fn test_bad_requests() {
        let executor =
            Executor::with_tools(vec![Box::new(AnyTool(EchoTool::new()))]);

        let result = executor
            .handle_request(&request("read_file", json!({})))
            .await;
        assert_eq!(result.name, "read_file");
        assert_eq!(payload(&result)["error"], "unknown_tool");

        let result = executor
            .handle_request(&request("echo", json!({ "txt": "hi" })))
            .await;
        assert_eq!(payload(&result)["error"], "invalid_arguments");
    }
}
