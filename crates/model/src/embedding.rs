use crate::provider::ModelProviderError;

/// A dense vector representing a piece of text.
pub type Embedding = Vec<f32>;

/// A provider that maps texts to embeddings, used by retrieval.
///
/// The same stateless expectations of [`crate::ModelProvider`] apply here.
pub trait EmbeddingProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Embeds every text in `texts`.
    ///
    /// On success the returned vector has exactly one embedding per input,
    /// in input order.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Embedding>, Self::Error>> + Send + 'static;
}
