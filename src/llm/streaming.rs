//! Streaming response aggregation
//!
//! Fragments of a streamed model response arrive over a tokio mpsc channel
//! as `StreamChunk`s. `StreamHandle` consumes them one at a time in arrival
//! order and concatenates the text, optionally forwarding each fragment to
//! a sink as it arrives.
//!
//! Failure contract: if the upstream stream errors, the aggregation fails
//! with `PromptrError::UpstreamStream` carrying everything aggregated so
//! far. Partial results are never discarded.

use tokio::sync::mpsc;

use crate::error::{PromptrError, Result};

/// Chunk types emitted to consumers during streaming
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamChunk {
    /// One fragment of response text
    Text(String),
    /// Stream completed successfully
    Done,
    /// Stream failed upstream
    Error(String),
}

/// Handle for receiving and aggregating streamed fragments
pub struct StreamHandle {
    receiver: mpsc::Receiver<StreamChunk>,
}

impl StreamHandle {
    /// Create a new stream handle with the given receiver.
    pub fn new(receiver: mpsc::Receiver<StreamChunk>) -> Self {
        Self { receiver }
    }

    /// Receive the next chunk. Returns None once the channel is closed.
    pub async fn recv(&mut self) -> Option<StreamChunk> {
        self.receiver.recv().await
    }

    /// Aggregate all text fragments into one string.
    ///
    /// A sender dropped without `Done` counts as an upstream failure; the
    /// partial result rides along in the error either way.
    pub async fn collect(&mut self) -> Result<String> {
        self.forward(|_| {}).await
    }

    /// Aggregate all text fragments, calling `sink` with each fragment as
    /// it arrives.
    pub async fn forward<F>(&mut self, mut sink: F) -> Result<String>
    where
        F: FnMut(&str),
    {
        let mut text = String::new();
        loop {
            match self.recv().await {
                Some(StreamChunk::Text(fragment)) => {
                    sink(&fragment);
                    text.push_str(&fragment);
                }
                Some(StreamChunk::Done) => return Ok(text),
                Some(StreamChunk::Error(message)) => {
                    return Err(PromptrError::UpstreamStream {
                        partial: text,
                        message,
                    });
                }
                None => {
                    return Err(PromptrError::UpstreamStream {
                        partial: text,
                        message: "stream closed before completion".to_string(),
                    });
                }
            }
        }
    }
}

/// Builder for stream channel pairs (sender and handle).
pub fn create_stream_channel(buffer_size: usize) -> (mpsc::Sender<StreamChunk>, StreamHandle) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (tx, StreamHandle::new(rx))
}
