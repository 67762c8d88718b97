use std::future::ready;

use hotel_assistant_model::{Embedding, EmbeddingProvider};

use crate::Error;

/// A fake embedder that counts vocabulary words.
///
/// Dimension `i` of an embedding is the number of times the `i`-th
/// vocabulary word appears in the text, matched case-insensitively with
/// punctuation stripped. Words outside the vocabulary are ignored, which
/// keeps similarities predictable in tests.
#[derive(Clone, Debug)]
pub struct TestEmbeddingProvider {
    vocabulary: Vec<String>,
}

impl TestEmbeddingProvider {
    pub fn with_vocabulary<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vocabulary: words
                .into_iter()
                .map(|w| w.into().to_lowercase())
                .collect(),
        }
    }

    fn embed_one(&self, text: &str) -> Embedding {
        let mut embedding = vec![0.0; self.vocabulary.len()];
        let words = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase);
        for word in words {
            if let Some(idx) = self.vocabulary.iter().position(|v| *v == word)
            {
                embedding[idx] += 1.0;
            }
        }
        embedding
    }
}

impl EmbeddingProvider for TestEmbeddingProvider {
    type Error = Error;

    fn embed(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Embedding>, Self::Error>> + Send + 'static
    {
        ready(Ok(texts.iter().map(|text| self.embed_one(text)).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_vocabulary_words() {
        let embedder =
            TestEmbeddingProvider::with_vocabulary(["gym", "coffee"]);
        let embeddings = embedder
            .embed(&["The Gym? gym!".to_owned(), "tea".to_owned()])
            .await
            .unwrap();
        assert_eq!(embeddings, vec![vec![2.0, 0.0], vec![0.0, 0.0]]);
    }
}
