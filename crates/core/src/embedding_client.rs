use std::pin::Pin;
use std::sync::Arc;

use hotel_assistant_model::{Embedding, EmbeddingProvider, ModelProviderError};
use tracing::Instrument;

type EmbedResult = Result<Vec<Embedding>, Box<dyn ModelProviderError>>;
type BoxedEmbedFuture = Pin<Box<dyn Future<Output = EmbedResult> + Send>>;
type HandlerFn = Arc<dyn Fn(Vec<String>) -> BoxedEmbedFuture + Send + Sync>;

/// A type-erased wrapper around an embedding provider.
#[derive(Clone)]
pub struct EmbeddingClient {
    handler_fn: HandlerFn,
}

impl EmbeddingClient {
    /// Wraps `provider`.
    pub fn new<P: EmbeddingProvider + 'static>(provider: P) -> Self {
        let provider = Arc::new(provider);
        let handler_fn: HandlerFn = Arc::new(move |texts| {
            let fut = provider.embed(&texts);
            Box::pin(
                async move {
                    trace!("embedding {} text(s)", texts.len());
                    let embeddings = fut.await.map_err(|err| {
                        error!("got an error: {err:?}");
                        Box::new(err) as Box<dyn ModelProviderError>
                    })?;
                    if embeddings.len() != texts.len() {
                        warn!(
                            "provider returned {} embeddings for {} texts",
                            embeddings.len(),
                            texts.len()
                        );
                    }
                    Ok(embeddings)
                }
                .instrument(trace_span!("embedding client req")),
            )
        });
        Self { handler_fn }
    }

    /// Embeds every text in `texts`, returning one embedding per text in
    /// input order.
    #[inline]
    pub async fn embed(&self, texts: Vec<String>) -> EmbedResult {
        (self.handler_fn)(texts).await
    }
}
