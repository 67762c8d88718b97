use std::pin::Pin;
use std::task::{Context, Poll, ready};

use hotel_assistant_model::{
    ErrorKind, ModelFinishReason, ModelResponse, ModelResponseEvent,
    ToolCallRequest,
};
use pin_project_lite::pin_project;
use serde_json::Value;

use crate::Error;
use crate::io::Sse;
use crate::proto::{ChatCompletionChunk, ToolCallDelta};

#[derive(Default)]
struct PartialToolCall {
    index: Option<u32>,
    id: String,
    name: String,
    arguments: String,
}

impl PartialToolCall {
    fn patch(&mut self, delta: ToolCallDelta) {
        if let Some(id) = delta.id {
            self.id.push_str(&id);
        }
        let Some(function) = delta.function else {
            return;
        };
        if let Some(name) = function.name {
            self.name.push_str(&name);
        }
        if let Some(arguments) = function.arguments {
            self.arguments.push_str(&arguments);
        }
    }

    fn to_request(&self) -> ToolCallRequest {
        // Models send "" for tools without parameters. Arguments that are
        // not JSON at all are passed on as a string so the tool can reject
        // them with a proper message.
        let arguments = if self.arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&self.arguments)
                .unwrap_or_else(|_| Value::String(self.arguments.clone()))
        };
        ToolCallRequest {
            id: self.id.clone(),
            name: self.name.clone(),
            arguments,
        }
    }
}

struct PartialState {
    sse: Sse,
    id: Option<String>,
    tool_calls: Vec<PartialToolCall>,
    // Tool calls are only emitted once the model has finished, since their
    // arguments arrive in fragments. This counts the ones already emitted.
    emitted_tool_calls: usize,
    // Set when the model reports a finish reason or the stream ends.
    finish_reason: Option<ModelFinishReason>,
    completed: bool,
}

impl PartialState {
    fn apply_chunk(
        &mut self,
        mut chunk: ChatCompletionChunk,
    ) -> Result<Option<String>, Error> {
        if let Some(err) = chunk.error {
            return Err(Error::new(err.message, ErrorKind::Other));
        }
        if !chunk.id.is_empty()
            && self.id.get_or_insert_with(|| chunk.id.clone()) != &chunk.id
        {
            return Err(Error::new("chunk id mismatch", ErrorKind::Protocol));
        }

        // Usage-only chunks have no choices.
        let Some(choice) = chunk.choices.pop() else {
            return Ok(None);
        };

        if let Some(tool_calls) = choice.delta.tool_calls {
            for delta in tool_calls {
                self.patch_tool_call(delta);
            }
        }
        if let Some(finish_reason) = choice.finish_reason {
            self.finish_reason = Some(if finish_reason == "tool_calls" {
                ModelFinishReason::ToolCalls
            } else {
                ModelFinishReason::Stop
            });
        }
        Ok(choice.delta.content.filter(|content| !content.is_empty()))
    }

    fn patch_tool_call(&mut self, delta: ToolCallDelta) {
        // Fragments without an index continue the latest call.
        let existing = match delta.index {
            Some(index) => {
                self.tool_calls.iter_mut().find(|t| t.index == Some(index))
            }
            None if delta.id.is_none() => self.tool_calls.last_mut(),
            None => None,
        };
        match existing {
            Some(partial) => partial.patch(delta),
            None => {
                let mut partial = PartialToolCall {
                    index: delta.index,
                    ..Default::default()
                };
                partial.patch(delta);
                self.tool_calls.push(partial);
            }
        }
    }

    fn next_pending_event(&mut self) -> Option<ModelResponseEvent> {
        if let Some(tool_call) = self.tool_calls.get(self.emitted_tool_calls) {
            self.emitted_tool_calls += 1;
            return Some(ModelResponseEvent::ToolCall(tool_call.to_request()));
        }
        if self.completed {
            return None;
        }
        self.completed = true;
        let finish_reason = self.finish_reason.unwrap_or_else(|| {
            if self.tool_calls.is_empty() {
                ModelFinishReason::Stop
            } else {
                ModelFinishReason::ToolCalls
            }
        });
        Some(ModelResponseEvent::Completed(finish_reason))
    }
}

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextEvent = Result<(Option<ModelResponseEvent>, PartialState), Error>;

pin_project! {
    /// A streaming chat completion.
    pub struct OpenAIResponse {
        next_event_fut: Option<PinnedFuture<NextEvent>>,
    }
}

impl OpenAIResponse {
    #[inline]
    pub fn from_sse(sse: Sse) -> Self {
        let partial_state = PartialState {
            sse,
            id: None,
            tool_calls: Default::default(),
            emitted_tool_calls: 0,
            finish_reason: None,
            completed: false,
        };
        Self {
            next_event_fut: Some(Box::pin(next_event(partial_state))),
        }
    }
}

impl ModelResponse for OpenAIResponse {
    type Error = crate::Error;

    fn poll_next_event(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<ModelResponseEvent>, Self::Error>> {
        let this = self.project();
        let Some(next_event_fut) = this.next_event_fut else {
            return Poll::Ready(Ok(None));
        };
        let (event, partial_state) =
            match ready!(next_event_fut.as_mut().poll(cx)) {
                Ok((Some(event), partial_state)) => (event, partial_state),
                Ok((None, _)) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Ok(None));
                }
                Err(err) => {
                    *this.next_event_fut = None;
                    return Poll::Ready(Err(err));
                }
            };

        // The stream may still have more data to pull, create a new future for
        // the next event.
        *this.next_event_fut = Some(Box::pin(next_event(partial_state)));

        Poll::Ready(Ok(Some(event)))
    }
}

async fn next_event(
    mut partial_state: PartialState,
) -> Result<(Option<ModelResponseEvent>, PartialState), Error> {
    // Text is forwarded as soon as it arrives. Everything else waits until
    // the model is done.
    while partial_state.finish_reason.is_none() {
        let sse_event = match partial_state.sse.next_event().await {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(err) => {
                return Err(Error::new(format!("{err}"), ErrorKind::Network));
            }
        };
        trace!("got sse event: {sse_event}");
        if sse_event == "[DONE]" {
            break;
        }

        let chunk = serde_json::from_str::<ChatCompletionChunk>(&sse_event)
            .map_err(|err| Error::new(format!("{err}"), ErrorKind::Protocol))?;
        if let Some(content) = partial_state.apply_chunk(chunk)? {
            return Ok((
                Some(ModelResponseEvent::MessageDelta(content)),
                partial_state,
            ));
        }
    }

    let event = partial_state.next_pending_event();
    Ok((event, partial_state))
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use bytes::Bytes;
    use serde_json::json;

    use super::*;
    use crate::io::Chunks;

    async fn collect_events(
        fixture: &'static [u8],
    ) -> Result<Vec<ModelResponseEvent>, Error> {
        let chunks = Chunks::from_recorded([Bytes::from_static(fixture)]);
        let mut resp = pin!(OpenAIResponse::from_sse(Sse::new(chunks)));
        let mut events = vec![];
        while let Some(event) =
            poll_fn(|cx| resp.as_mut().poll_next_event(cx)).await?
        {
            events.push(event);
        }
        Ok(events)
    }

    #[tokio::test]
    async fn test_tool_call_events() {
        let events =
            collect_events(include_bytes!("../fixtures/tool_calls.txt"))
                .await
                .unwrap();
        assert_eq!(
            events,
            vec![
                ModelResponseEvent::ToolCall(ToolCallRequest {
                    id: "call_items".to_owned(),
                    name: "get_items".to_owned(),
                    arguments: json!({ "categories": "Miscellaneous" }),
                }),
                ModelResponseEvent::ToolCall(ToolCallRequest {
                    id: "call_brochure".to_owned(),
                    name: "rag_pipeline_func".to_owned(),
                    arguments: json!({ "query": "When does the gym open?" }),
                }),
                ModelResponseEvent::Completed(ModelFinishReason::ToolCalls),
            ]
        );
    }

    #[tokio::test]
    async fn test_text_events() {
        let events = collect_events(include_bytes!("../fixtures/text.txt"))
            .await
            .unwrap();
        assert_eq!(
            events,
            vec![
                ModelResponseEvent::MessageDelta("The gym ".to_owned()),
                ModelResponseEvent::MessageDelta("opens at 6am.".to_owned()),
                ModelResponseEvent::Completed(ModelFinishReason::Stop),
            ]
        );
    }

    #[tokio::test]
    async fn test_error_event() {
        let err = collect_events(
            b"data: {\"error\":{\"message\":\"upstream down\",\"code\":502}}\n\n",
        )
        .await
        .unwrap_err();
        assert_eq!(err.message(), "upstream down");
    }

    #[tokio::test]
    async fn test_malformed_arguments_keep_raw_text() {
        let events = collect_events(
            b"data: {\"id\":\"c\",\"choices\":[{\"delta\":{\"tool_calls\":\
              [{\"index\":0,\"id\":\"call_1\",\"function\":\
              {\"name\":\"get_items\",\"arguments\":\"{ids: 1,2\"}}]}}]}\n\n\
              data: {\"id\":\"c\",\"choices\":\
              [{\"delta\":{},\"finish_reason\":\"tool_calls\"}]}\n\n",
        )
        .await
        .unwrap();
        assert_eq!(
            events[0],
            ModelResponseEvent::ToolCall(ToolCallRequest {
                id: "call_1".to_owned(),
                name: "get_items".to_owned(),
                arguments: Value::String("{ids: 1,2".to_owned()),
            })
        );
    }

    #[tokio::test]
    async fn test_stream_without_finish_reason() {
        let events = collect_events(
            b"data: {\"id\":\"c\",\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
        )
        .await
        .unwrap();
        assert_eq!(
            events.last(),
            Some(&ModelResponseEvent::Completed(ModelFinishReason::Stop))
        );
    }
}
