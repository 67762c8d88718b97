use std::cmp::Ordering;

use hotel_assistant_model::Embedding;

/// A text with its embedding.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// The text of the document.
    pub content: String,
    /// The embedding of [`Document::content`].
    pub embedding: Embedding,
}

/// An in-memory store searched by embedding similarity.
#[derive(Clone, Debug, Default)]
pub struct DocumentStore {
    documents: Vec<Document>,
}

impl DocumentStore {
    /// Adds a document.
    #[inline]
    pub fn insert(&mut self, document: Document) {
        self.documents.push(document);
    }

    /// Returns the number of documents.
    #[inline]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the store has no documents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns up to `top_k` documents, most similar to `query` first.
    ///
    /// Documents scoring the same keep their insertion order.
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<&Document> {
        let mut scored: Vec<_> = self
            .documents
            .iter()
            .map(|doc| (doc, cosine_similarity(query, &doc.embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);
        scored.into_iter().map(|(doc, _)| doc).collect()
    }
}

/// Cosine similarity of two vectors. Vectors of different lengths and zero
/// vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str, embedding: &[f32]) -> Document {
        Document {
            content: content.to_owned(),
            embedding: embedding.to_vec(),
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = [1.0, 2.0, 3.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_search_ranks_and_truncates() {
        let mut store = DocumentStore::default();
        store.insert(doc("pool", &[1.0, 0.0]));
        store.insert(doc("spa", &[0.0, 1.0]));
        store.insert(doc("pool and spa", &[1.0, 1.0]));
        store.insert(doc("nothing", &[0.0, 0.0]));
        assert_eq!(store.len(), 4);

        let found: Vec<_> = store
            .search(&[0.0, 1.0], 10)
            .into_iter()
            .map(|doc| doc.content.as_str())
            .collect();
        assert_eq!(found, vec!["spa", "pool and spa", "pool", "nothing"]);

        let found = store.search(&[1.0, 0.2], 1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].content, "pool");
    }
}
