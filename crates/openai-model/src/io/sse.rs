use std::fmt::{self, Display};
use std::mem;

use super::{Chunks, ChunksError};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    Chunks(ChunksError),
    InvalidPayload,
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Chunks(err) => Display::fmt(err, f),
            Error::InvalidPayload => write!(f, "event stream is not UTF-8"),
        }
    }
}

/// A type for reading server-sent events from a chunk stream.
///
/// Only the `data` field is collected. Comment lines (OpenRouter sends
/// `: OPENROUTER PROCESSING` while the model warms up) and other fields
/// are skipped. Bytes are buffered until a whole line is available, so a
/// multi-byte character split between chunks decodes correctly.
pub struct Sse {
    buf: Vec<u8>,
    data: Vec<String>,
    chunks: Chunks,
    exhausted: bool,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: Vec::new(),
            data: Vec::new(),
            chunks,
            exhausted: false,
        }
    }

    /// Returns the data of the next complete event.
    ///
    /// An event that is still open when the stream ends is dropped.
    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            while let Some(line) = self.take_line()? {
                if let Some(event) = self.feed_line(&line) {
                    return Ok(Some(event));
                }
            }

            if self.exhausted {
                return Ok(None);
            }
            match self.chunks.next_chunk().await.map_err(Error::Chunks)? {
                Some(bytes) => self.buf.extend_from_slice(&bytes),
                None => self.exhausted = true,
            }
        }
    }

    fn take_line(&mut self) -> Result<Option<String>, Error> {
        let Some(eol_idx) = self.buf.iter().position(|b| *b == b'\n') else {
            return Ok(None);
        };
        let mut line: Vec<u8> = self.buf.drain(..=eol_idx).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        String::from_utf8(line)
            .map(Some)
            .map_err(|_| Error::InvalidPayload)
    }

    fn feed_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            // Blank line dispatches the event, if any data was collected.
            if self.data.is_empty() {
                return None;
            }
            return Some(mem::take(&mut self.data).join("\n"));
        }
        if line.starts_with(':') {
            trace!("skipping sse comment: {line}");
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => {
                (field, value.strip_prefix(' ').unwrap_or(value))
            }
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_owned());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn sse_of(chunks: &[&'static [u8]]) -> Sse {
        Sse::new(Chunks::from_recorded(
            chunks.iter().copied().map(Bytes::from_static),
        ))
    }

    #[tokio::test]
    async fn test_normal_events() {
        let mut sse = sse_of(&[b"data: hello\n\n", b"data: bye\n\n"]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "bye");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quirk_streaming() {
        let mut sse = sse_of(&[b"data:", b" hello\n", b"\n"]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_split_multibyte_character() {
        // "水" is e6 b0 b4 in UTF-8.
        let mut sse = sse_of(&[b"data: \xe6\xb0", b"\xb4\n\n"]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "水");
    }

    #[tokio::test]
    async fn test_comments_and_crlf() {
        let mut sse = sse_of(&[
            b": OPENROUTER PROCESSING\n\n",
            b"event: message\r\ndata: {\"a\":1}\r\n\r\n",
        ]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "{\"a\":1}");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_multi_line_data() {
        let mut sse = sse_of(&[b"data: first\ndata: second\n\n"]);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "first\nsecond");
    }

    #[tokio::test]
    async fn test_incomplete_and_invalid_data() {
        let mut sse = sse_of(&[b"data: hello\n", b"data: bye\n"]);
        assert_eq!(sse.next_event().await.unwrap(), None);

        let mut sse = sse_of(&[b"xxxxxx\n\n"]);
        assert_eq!(sse.next_event().await.unwrap(), None);

        let mut sse = sse_of(&[b"data: \xff\xfe\n\n"]);
        assert_eq!(sse.next_event().await.unwrap_err(), Error::InvalidPayload);
    }
}
