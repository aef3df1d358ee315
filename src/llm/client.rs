//! Chat client trait and mock implementation
//!
//! The template layer treats the model backend as an opaque collaborator:
//! `invoke` for a complete response, `stream` for incremental fragments.
//! Retry and backoff policy belongs to implementations, never to callers
//! of this trait.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::streaming::StreamChunk;
use crate::error::Result;
use crate::template::RenderedMessage;

/// A complete model response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatResponse {
    pub content: String,
    pub usage: TokenUsage,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    pub fn total(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Stateless chat-completion client - each call is independent
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Single completion request (blocking until complete)
    async fn invoke(&self, messages: &[RenderedMessage]) -> Result<ChatResponse>;

    /// Streaming completion; fragments are sent over `chunk_tx` in
    /// generation order, terminated by `Done` or `Error`
    async fn stream(
        &self,
        messages: &[RenderedMessage],
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<()>;
}

/// Canned client for tests and offline demos
#[derive(Debug, Clone)]
pub struct MockChatClient {
    response: String,
    fragments: Vec<String>,
    fail_after: Option<usize>,
}

impl MockChatClient {
    /// Client that replies with `response`, streamed one whitespace-delimited
    /// word at a time
    pub fn new(response: impl Into<String>) -> Self {
        let response = response.into();
        let fragments = response
            .split_inclusive(' ')
            .map(str::to_string)
            .collect();
        Self {
            response,
            fragments,
            fail_after: None,
        }
    }

    /// Override the streamed fragment script
    pub fn with_fragments(mut self, fragments: Vec<String>) -> Self {
        self.response = fragments.concat();
        self.fragments = fragments;
        self
    }

    /// Fail the stream after emitting `n` fragments
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn invoke(&self, messages: &[RenderedMessage]) -> Result<ChatResponse> {
        let prompt_tokens = messages.iter().map(|m| m.content.len() as u64 / 4).sum();
        Ok(ChatResponse {
            content: self.response.clone(),
            usage: TokenUsage::new(prompt_tokens, self.response.len() as u64 / 4),
        })
    }

    async fn stream(
        &self,
        _messages: &[RenderedMessage],
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<()> {
        for (i, fragment) in self.fragments.iter().enumerate() {
            if self.fail_after == Some(i) {
                let _ = chunk_tx
                    .send(StreamChunk::Error("mock stream failure".to_string()))
                    .await;
                return Ok(());
            }
            if chunk_tx.send(StreamChunk::Text(fragment.clone())).await.is_err() {
                // Receiver dropped: consumer cancelled, stop promptly
                return Ok(());
            }
        }
        if self.fail_after == Some(self.fragments.len()) {
            let _ = chunk_tx
                .send(StreamChunk::Error("mock stream failure".to_string()))
                .await;
        } else {
            let _ = chunk_tx.send(StreamChunk::Done).await;
        }
        Ok(())
    }
}
