//! Answers brochure questions by retrieval-augmented generation.
//!
//! The brochure is embedded once when the pipeline is built. Each question
//! is embedded, the closest documents are rendered into a prompt, and the
//! chat model completes it without tools.

mod store;

use std::fmt::Write as _;

use hotel_assistant_core::{EmbeddingClient, ModelClient};
use hotel_assistant_model::{Embedding, ModelProviderError};
use thiserror::Error;

pub use store::{Document, DocumentStore, cosine_similarity};

/// The hotel brochure.
pub const BROCHURE: [&str; 2] = [
    "Coffee shop opens at 9am and closes at 5pm.",
    "Gym room opens at 6am and closes at 10pm.",
];

/// The number of documents retrieved per question by default.
pub const DEFAULT_TOP_K: usize = 10;

/// The error type for the retrieval pipeline.
#[derive(Debug, Error)]
pub enum RagError {
    /// The embedding request failed.
    #[error("embedding failed: {0}")]
    Embedding(Box<dyn ModelProviderError>),

    /// The provider returned the wrong number of embeddings.
    #[error("expected {expected} embeddings, got {actual}")]
    EmbeddingCount {
        /// Number of texts sent.
        expected: usize,
        /// Number of embeddings received.
        actual: usize,
    },

    /// The completion request failed.
    #[error("generation failed: {0}")]
    Generation(Box<dyn ModelProviderError>),
}

/// A retrieval pipeline over an in-memory document store.
pub struct RagPipeline {
    embedder: EmbeddingClient,
    generator: ModelClient,
    store: DocumentStore,
    top_k: usize,
}

impl RagPipeline {
    /// Embeds `documents` and builds a pipeline over them.
    pub async fn build<I, S>(
        embedder: EmbeddingClient,
        generator: ModelClient,
        documents: I,
    ) -> Result<Self, RagError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let texts: Vec<String> =
            documents.into_iter().map(Into::into).collect();
        let embeddings = embed_exact(&embedder, texts.clone()).await?;

        let mut store = DocumentStore::default();
        for (content, embedding) in texts.into_iter().zip(embeddings) {
            store.insert(Document { content, embedding });
        }
        debug!("indexed {} document(s)", store.len());

        Ok(Self {
            embedder,
            generator,
            store,
            top_k: DEFAULT_TOP_K,
        })
    }

    /// Sets how many documents are retrieved per question.
    #[inline]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Returns the documents most relevant to `query`, best first.
    pub async fn retrieve(
        &self,
        query: &str,
    ) -> Result<Vec<&Document>, RagError> {
        let mut embeddings =
            embed_exact(&self.embedder, vec![query.to_owned()]).await?;
        let query_embedding = embeddings.pop().unwrap_or_default();
        Ok(self.store.search(&query_embedding, self.top_k))
    }

    /// Answers `query` from the retrieved documents.
    pub async fn answer(&self, query: &str) -> Result<String, RagError> {
        let documents = self.retrieve(query).await?;
        trace!("retrieved {} document(s) for {query:?}", documents.len());
        let prompt = render_prompt(&documents, query);
        self.generator
            .complete(prompt)
            .await
            .map_err(RagError::Generation)
    }
}

async fn embed_exact(
    embedder: &EmbeddingClient,
    texts: Vec<String>,
) -> Result<Vec<Embedding>, RagError> {
    let expected = texts.len();
    let embeddings =
        embedder.embed(texts).await.map_err(RagError::Embedding)?;
    if embeddings.len() != expected {
        return Err(RagError::EmbeddingCount {
            expected,
            actual: embeddings.len(),
        });
    }
    Ok(embeddings)
}

/// Renders the question prompt for the generator.
pub fn render_prompt(documents: &[&Document], question: &str) -> String {
    let mut prompt =
        "Answer the questions based on the given context.\n\nContext:\n"
            .to_owned();
    for document in documents {
        writeln!(prompt, "{}", document.content).ok();
    }
    write!(prompt, "Question: {question}\nAnswer:").ok();
    prompt
}

#[cfg(test)]
mod tests {
    use hotel_assistant_model::{ErrorKind, ModelMessage};
    use hotel_assistant_test_model::{
        PresetResponse, TestEmbeddingProvider, TestModelProvider,
    };

    use super::*;

    fn embedder() -> EmbeddingClient {
        EmbeddingClient::new(TestEmbeddingProvider::with_vocabulary([
            "coffee", "gym", "shop", "room",
        ]))
    }

    #[test]
    fn test_render_prompt() {
        let gym = Document {
            content: BROCHURE[1].to_owned(),
            embedding: vec![],
        };
        assert_eq!(
            render_prompt(&[&gym], "When does the gym open?"),
            "Answer the questions based on the given context.\n\n\
             Context:\n\
             Gym room opens at 6am and closes at 10pm.\n\
             Question: When does the gym open?\n\
             Answer:"
        );
    }

    #[tokio::test]
    async fn test_answer_uses_closest_documents() {
        let generator = TestModelProvider::with_responses([
            PresetResponse::text("The gym opens at 6am."),
        ]);
        let rag = RagPipeline::build(
            embedder(),
            ModelClient::new(generator.clone()),
            BROCHURE,
        )
        .await
        .unwrap()
        .with_top_k(1);

        let answer = rag.answer("When does the gym open?").await.unwrap();
        assert_eq!(answer, "The gym opens at 6am.");

        let requests = generator.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].tools.is_empty());
        let [ModelMessage::User(prompt)] = requests[0].messages.as_slice()
        else {
            panic!("expected a single user prompt");
        };
        assert!(prompt.contains(BROCHURE[1]));
        assert!(!prompt.contains(BROCHURE[0]));
    }

    #[tokio::test]
    async fn test_retrieve_orders_by_similarity() {
        let rag = RagPipeline::build(
            embedder(),
            ModelClient::new(TestModelProvider::default()),
            BROCHURE,
        )
        .await
        .unwrap();

        let documents = rag.retrieve("Is the coffee shop open?").await.unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].content, BROCHURE[0]);
    }

    #[tokio::test]
    async fn test_generation_error() {
        let rag = RagPipeline::build(
            embedder(),
            ModelClient::new(TestModelProvider::default()),
            BROCHURE,
        )
        .await
        .unwrap();

        match rag.answer("Gym?").await.unwrap_err() {
            RagError::Generation(err) => {
                assert_eq!(err.kind(), ErrorKind::Other);
            }
            err => panic!("unexpected error: {err}"),
        }
    }
}
