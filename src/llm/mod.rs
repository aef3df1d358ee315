//! LLM Client Layer - chat-completion backends and streaming
//!
//! This module provides:
//! - The ChatClient trait for backend abstraction
//! - An OpenAI-compatible implementation
//! - Stream chunk aggregation with a partial-result-preserving
//!   failure contract

pub mod client;
pub mod openai;
pub mod streaming;

pub use client::{ChatClient, ChatResponse, MockChatClient, TokenUsage};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use streaming::{StreamChunk, StreamHandle, create_stream_channel};
