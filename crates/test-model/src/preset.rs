use hotel_assistant_model::{ModelFinishReason, ToolCallRequest};
use serde::{Deserialize, Serialize};

/// The events in a preset response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetEvent {
    #[serde(rename = "message_delta")]
    MessageDelta(String),
    #[serde(rename = "tool_call")]
    ToolCall(ToolCallRequest),
}

/// The preset response for one model request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetResponse {
    /// Events in this response.
    pub events: Vec<PresetEvent>,
    /// If set, the request will fail in the first `failures` attempts with
    /// a rate limit error. `Some(0)` means the request will fail infinitely.
    pub failures: Option<u64>,
    /// How the response ends. When unset, it finishes with
    /// [`ModelFinishReason::ToolCalls`] if any tool is called, and with
    /// [`ModelFinishReason::Stop`] otherwise.
    #[serde(default)]
    pub finish: Option<PresetFinish>,
}

/// The end of a preset response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetFinish {
    /// The response completes with this reason.
    #[serde(rename = "reason")]
    Reason(ModelFinishReason),
    /// The stream ends without a completion event.
    #[serde(rename = "unfinished")]
    Unfinished,
}

impl PresetResponse {
    /// Creates a `PresetResponse` with the specified events.
    #[inline]
    pub fn with_events(events: impl Into<Vec<PresetEvent>>) -> Self {
        Self {
            events: events.into(),
            failures: None,
            finish: None,
        }
    }

    /// Creates a plain text reply, streamed word by word.
    pub fn text(reply: &str) -> Self {
        let mut events = vec![];
        let mut words = reply.split(' ').peekable();
        while let Some(word) = words.next() {
            let mut delta = word.to_owned();
            if words.peek().is_some() {
                delta.push(' ');
            }
            events.push(PresetEvent::MessageDelta(delta));
        }
        Self::with_events(events)
    }

    /// Creates a response that requests the given tool calls.
    pub fn tool_calls<I>(calls: I) -> Self
    where
        I: IntoIterator<Item = ToolCallRequest>,
    {
        Self::with_events(
            calls.into_iter().map(PresetEvent::ToolCall).collect::<Vec<_>>(),
        )
    }

    /// Sets failure times before a successful response. `0` means the
    /// response will always be a failure.
    #[inline]
    pub fn with_failures(mut self, failures: u64) -> Self {
        self.failures = Some(failures);
        self
    }

    /// Overrides the finish reason of the response.
    #[inline]
    pub fn with_finish_reason(mut self, reason: ModelFinishReason) -> Self {
        self.finish = Some(PresetFinish::Reason(reason));
        self
    }

    /// Ends the response without a completion event.
    #[inline]
    pub fn unfinished(mut self) -> Self {
        self.finish = Some(PresetFinish::Unfinished);
        self
    }

    /// Returns the finish reason reported at the end of the response, if
    /// any.
    pub(crate) fn finish_reason(&self) -> Option<ModelFinishReason> {
        match self.finish {
            Some(PresetFinish::Reason(reason)) => Some(reason),
            Some(PresetFinish::Unfinished) => None,
            None if self.has_tool_call() => {
                Some(ModelFinishReason::ToolCalls)
            }
            None => Some(ModelFinishReason::Stop),
        }
    }

    #[inline]
    pub(crate) fn has_tool_call(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, PresetEvent::ToolCall(_)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let response = PresetResponse::with_events([
            PresetEvent::MessageDelta("Let me check the stock.".to_string()),
            PresetEvent::ToolCall(ToolCallRequest {
                id: "1".to_string(),
                name: "get_items".to_string(),
                arguments: json!({ "ids": "1,2" }),
            }),
        ]);

        let serialized = serde_json::to_string(&response).unwrap();
        let deserialized: PresetResponse =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(response, deserialized);
    }

    #[test]
    fn test_text_splits_words() {
        let response = PresetResponse::text("Water costs 1.0");
        assert_eq!(
            response.events,
            vec![
                PresetEvent::MessageDelta("Water ".to_owned()),
                PresetEvent::MessageDelta("costs ".to_owned()),
                PresetEvent::MessageDelta("1.0".to_owned()),
            ]
        );
        assert!(!response.has_tool_call());
    }

    #[test]
    fn test_finish_reason() {
        let call = ToolCallRequest {
            id: "1".to_string(),
            name: "get_items".to_string(),
            arguments: json!({}),
        };
        let response = PresetResponse::tool_calls([call]);
        assert_eq!(
            response.finish_reason(),
            Some(ModelFinishReason::ToolCalls)
        );

        let response = response.with_finish_reason(ModelFinishReason::Stop);
        assert_eq!(response.finish_reason(), Some(ModelFinishReason::Stop));

        let response = response.unfinished();
        assert_eq!(response.finish_reason(), None);

        let serialized = serde_json::to_string(&response).unwrap();
        let deserialized: PresetResponse =
            serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized.finish, Some(PresetFinish::Unfinished));
    }
}
