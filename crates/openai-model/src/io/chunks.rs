#[cfg(test)]
use std::collections::VecDeque;
use std::fmt::{self, Display};

use bytes::Bytes;
use reqwest::Response;

/// The body stream broke before it was finished.
#[derive(Debug, PartialEq, Eq)]
pub struct Error(pub String);

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to read response body: {}", self.0)
    }
}

/// A source of byte chunks, either a live response body or a recorded
/// sequence in tests.
pub enum Chunks {
    Response(Response),
    #[cfg(test)]
    Recorded(VecDeque<Bytes>),
}

impl Chunks {
    #[inline]
    pub fn from_response(response: Response) -> Self {
        Chunks::Response(response)
    }

    #[cfg(test)]
    pub fn from_recorded<I: IntoIterator<Item = Bytes>>(chunks: I) -> Self {
        Chunks::Recorded(chunks.into_iter().collect())
    }

    /// Returns the next chunk, or `None` when the body is exhausted.
    #[inline]
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, Error> {
        match self {
            Chunks::Response(response) => response
                .chunk()
                .await
                .map_err(|err| Error(err.to_string())),
            #[cfg(test)]
            Chunks::Recorded(chunks) => Ok(chunks.pop_front()),
        }
    }
}
