//! Progressive delivery of assistant text to a presentation layer.
//!
//! The orchestrator produces [`StreamChunk`]s on a channel while the model
//! is generating. A [`StreamingTranscript`] on the other end accumulates
//! them and hands the whole text so far to a [`Render`] implementation
//! after every fragment.

use tokio::sync::mpsc;

/// A fragment received from the model while streaming.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamChunk {
    /// Text of the fragment. Fragments that belong to a tool call payload
    /// have no content.
    pub content: Option<String>,
}

impl StreamChunk {
    /// Creates a text fragment.
    #[inline]
    pub fn text<S: Into<String>>(content: S) -> Self {
        Self {
            content: Some(content.into()),
        }
    }

    /// Creates a fragment standing for a tool call payload.
    #[inline]
    pub fn tool_call() -> Self {
        Self { content: None }
    }
}

/// Sending half of a chunk channel.
pub type ChunkSender = mpsc::UnboundedSender<StreamChunk>;

/// Receiving half of a chunk channel.
pub type ChunkReceiver = mpsc::UnboundedReceiver<StreamChunk>;

/// Creates a chunk channel.
///
/// The receiver finishes once every sender is dropped, which happens when
/// the turn that was given the sender ends.
#[inline]
pub fn channel() -> (ChunkSender, ChunkReceiver) {
    mpsc::unbounded_channel()
}

/// A sink that displays the text streamed so far.
pub trait Render {
    /// Shows `text`, which is everything received in this stream so far.
    fn render(&mut self, text: &str);
}

impl<F: FnMut(&str)> Render for F {
    #[inline]
    fn render(&mut self, text: &str) {
        self(text)
    }
}

/// Accumulates streamed fragments and re-renders the growing text.
pub struct StreamingTranscript<R> {
    current_text: String,
    renderer: R,
}

impl<R: Render> StreamingTranscript<R> {
    /// Creates an empty transcript that draws with `renderer`.
    #[inline]
    pub fn new(renderer: R) -> Self {
        Self {
            current_text: String::new(),
            renderer,
        }
    }

    /// Appends a fragment and re-renders. Fragments without content are
    /// ignored.
    pub fn push(&mut self, chunk: StreamChunk) {
        let Some(content) = chunk.content else {
            return;
        };
        self.current_text.push_str(&content);
        self.renderer.render(&self.current_text);
    }

    /// Returns the text accumulated so far.
    #[inline]
    pub fn text(&self) -> &str {
        &self.current_text
    }

    /// Consumes chunks until the channel closes and returns the full text.
    pub async fn consume(mut self, mut rx: ChunkReceiver) -> String {
        while let Some(chunk) = rx.recv().await {
            self.push(chunk);
        }
        self.current_text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rerenders_whole_text() {
        let mut frames = vec![];
        let mut transcript =
            StreamingTranscript::new(|text: &str| frames.push(text.to_owned()));
        transcript.push(StreamChunk::text("The coffee "));
        transcript.push(StreamChunk::tool_call());
        transcript.push(StreamChunk::text("shop opens at 9am."));
        assert_eq!(transcript.text(), "The coffee shop opens at 9am.");
        drop(transcript);

        assert_eq!(
            frames,
            vec!["The coffee ", "The coffee shop opens at 9am."]
        );
    }

    #[tokio::test]
    async fn test_consume_until_closed() {
        let (tx, rx) = channel();
        tx.send(StreamChunk::text("Hello")).unwrap();
        tx.send(StreamChunk::tool_call()).unwrap();
        tx.send(StreamChunk::text(", guest")).unwrap();
        drop(tx);

        let mut renders = 0;
        let text = StreamingTranscript::new(|_: &str| renders += 1)
            .consume(rx)
            .await;
        assert_eq!(text, "Hello, guest");
        assert_eq!(renders, 2);
    }
}
