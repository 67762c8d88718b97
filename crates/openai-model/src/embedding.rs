use hotel_assistant_model::{Embedding, EmbeddingProvider, ErrorKind};

use crate::proto::{self, EmbeddingResponse};
use crate::{Error, OpenAIProvider, check_status};

impl EmbeddingProvider for OpenAIProvider {
    type Error = Error;

    fn embed(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Embedding>, Self::Error>> + Send + 'static
    {
        let expected = texts.len();
        let body = proto::create_embedding_request(texts, &self.config);
        let resp_fut = self.post("/embeddings").json(&body).send();

        async move {
            let resp = check_status(resp_fut.await).await?;
            let resp: EmbeddingResponse = resp.json().await.map_err(|err| {
                Error::new(format!("{err}"), ErrorKind::Protocol)
            })?;
            debug!("received {} embeddings", resp.data.len());
            into_embeddings(resp, expected)
        }
    }
}

/// Orders the returned vectors by their input index.
fn into_embeddings(
    mut resp: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Embedding>, Error> {
    if resp.data.len() != expected {
        return Err(Error::new(
            format!(
                "expected {expected} embeddings, got {}",
                resp.data.len()
            ),
            ErrorKind::Protocol,
        ));
    }
    resp.data.sort_by_key(|data| data.index);
    Ok(resp.data.into_iter().map(|data| data.embedding).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embeddings_are_reordered() {
        let resp: EmbeddingResponse = serde_json::from_str(
            r#"{
                "object": "list",
                "data": [
                    { "object": "embedding", "index": 1, "embedding": [0.0, 1.0] },
                    { "object": "embedding", "index": 0, "embedding": [1.0, 0.0] }
                ],
                "model": "text-embedding-3-small"
            }"#,
        )
        .unwrap();
        let embeddings = into_embeddings(resp, 2).unwrap();
        assert_eq!(embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_count_mismatch() {
        let resp = EmbeddingResponse { data: vec![] };
        let err = into_embeddings(resp, 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Protocol);
    }
}
