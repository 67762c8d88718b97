use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;
use std::time::Duration;

use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use hotel_assistant_model::{
    ErrorKind, ModelFinishReason, ModelProvider, ModelProviderError,
    ModelRequest, ModelResponse, ModelResponseEvent, ToolCallRequest,
};
use tracing::Instrument;

use crate::stream::{ChunkSender, StreamChunk};

type SendRequestResult =
    Result<ModelClientResponse, Box<dyn ModelProviderError>>;
type BoxedSendRequestFuture =
    Pin<Box<dyn Future<Output = SendRequestResult> + Send>>;
#[rustfmt::skip]
type HandlerFn = Arc<
    dyn Fn(ModelRequest, Option<ChunkSender>)
        -> BoxedSendRequestFuture + Send + Sync
>;

/// How requests rejected for rate limiting are retried.
///
/// Retries back off exponentially from `initial_interval` and stop once
/// `max_elapsed_time` has passed since the first attempt. Other errors are
/// never retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub initial_interval: Duration,
    /// Total time budget for all attempts.
    pub max_elapsed_time: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    #[inline]
    pub fn never() -> Self {
        Self {
            initial_interval: Duration::ZERO,
            max_elapsed_time: Duration::ZERO,
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_interval)
            .with_max_elapsed_time(Some(self.max_elapsed_time))
            .build()
    }
}

impl Default for RetryPolicy {
    #[inline]
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            max_elapsed_time: Duration::from_secs(30),
        }
    }
}

/// A wrapper around a model provider that maintains an execution
/// environment for the provider and provides a type-erased interface
/// for the other modules.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    /// Wraps `provider`, retrying rate limited requests with the default
    /// policy.
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        Self::with_retry_policy(provider, RetryPolicy::default())
    }

    /// Wraps `provider` with a custom retry policy.
    pub fn with_retry_policy<P: ModelProvider + 'static>(
        provider: P,
        retry_policy: RetryPolicy,
    ) -> Self {
        // We have to erase the type `P`, since `ModelClient` doesn't have a
        // generic parameter and we don't want it either.
        let provider = Arc::new(provider);
        let handler_fn: HandlerFn = Arc::new(move |req, chunk_tx| {
            let provider = Arc::clone(&provider);
            Box::pin(
                async move {
                    trace!("got a request: {:?}", req);
                    let resp_or_err = backoff::future::retry_notify(
                        retry_policy.backoff(),
                        || {
                            let fut = provider.send_request(&req);
                            async move { fut.await.map_err(classify::<P>) }
                        },
                        |err: P::Error, after: Duration| {
                            warn!("request failed ({err}), retry in {after:?}");
                        },
                    )
                    .await;
                    handle_response::<P>(resp_or_err, chunk_tx).await
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and returns the response.
    ///
    /// Text deltas are forwarded to `chunk_tx` while the response streams
    /// in, and every tool call is announced with a content-less chunk.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. The response stops streaming further
    /// events when this operation is cancelled.
    #[inline]
    pub async fn send_request(
        &self,
        req: ModelRequest,
        chunk_tx: Option<ChunkSender>,
    ) -> Result<ModelClientResponse, Box<dyn ModelProviderError>> {
        (self.handler_fn)(req, chunk_tx).await
    }

    /// Runs a single-turn completion of `prompt` without tools and returns
    /// the generated text.
    pub async fn complete(
        &self,
        prompt: String,
    ) -> Result<String, Box<dyn ModelProviderError>> {
        let resp = self
            .send_request(ModelRequest::with_prompt(prompt), None)
            .await?;
        Ok(resp.transcript)
    }
}

/// A completely received response from the model client.
#[derive(Clone, Debug)]
pub struct ModelClientResponse {
    /// All text deltas joined together.
    pub transcript: String,
    /// Tool calls requested by the model, in the order they were received.
    pub tool_calls: Vec<ToolCallRequest>,
    /// The reason the model finished generating.
    pub finish_reason: Option<ModelFinishReason>,
}

#[inline]
fn classify<P: ModelProvider>(err: P::Error) -> backoff::Error<P::Error> {
    if err.kind() == ErrorKind::RateLimitExceeded {
        backoff::Error::transient(err)
    } else {
        backoff::Error::permanent(err)
    }
}

async fn handle_response<P: ModelProvider + 'static>(
    resp_or_err: Result<P::Response, P::Error>,
    chunk_tx: Option<ChunkSender>,
) -> SendRequestResult {
    let resp = match resp_or_err {
        Ok(resp) => resp,
        Err(err) => {
            error!("got an error: {err:?}");
            return Err(Box::new(err));
        }
    };

    let mut transcript = String::new();
    let mut tool_calls = Vec::new();
    let mut finish_reason = None;

    // The receiver going away only means nobody watches the stream anymore.
    let forward = |chunk: StreamChunk| {
        if let Some(tx) = &chunk_tx {
            tx.send(chunk).ok();
        }
    };

    trace!("start receiving events");

    let mut pinned_resp = pin!(resp);
    loop {
        let event_or_err =
            poll_fn(|cx| pinned_resp.as_mut().poll_next_event(cx)).await;
        let event = match event_or_err {
            Ok(event) => event,
            Err(err) => {
                error!("got an error: {err:?}");
                return Err(Box::new(err));
            }
        };

        let Some(event) = event else {
            break;
        };
        trace!("got an event: {event:?}");

        match event {
            ModelResponseEvent::MessageDelta(msg) => {
                transcript.push_str(&msg);
                forward(StreamChunk::text(msg));
            }
            ModelResponseEvent::ToolCall(req) => {
                tool_calls.push(req);
                forward(StreamChunk::tool_call());
            }
            ModelResponseEvent::Completed(reason) => {
                finish_reason = Some(reason);
            }
        }
    }

    trace!("finished a request");

    Ok(ModelClientResponse {
        transcript,
        tool_calls,
        finish_reason,
    })
}
