//! promptr - chat prompt templates with partial application
//!
//! Build an ordered, role-tagged prompt template, pre-bind a subset of its
//! variables, render the rest at call time, and hand the messages to a
//! chat-completion client. Streamed responses aggregate fragment by
//! fragment, preserving partial content when the upstream fails.

pub mod error;
pub mod llm;
pub mod template;

pub use error::{PromptrError, Result};
pub use llm::{
    ChatClient, ChatResponse, MockChatClient, OpenAiClient, OpenAiConfig, StreamChunk,
    StreamHandle, create_stream_channel,
};
pub use template::{Bindings, MessageTemplate, PromptTemplate, RenderedMessage, Role, bindings};
