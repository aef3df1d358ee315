//! Message types for chat prompt templates
//!
//! Defines the role enumeration, the unrendered message template, and the
//! rendered message handed to a chat client.

use serde::{Deserialize, Serialize};

use crate::error::{PromptrError, Result};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Assistant,
}

impl Role {
    /// Parse a role tag. Accepts "user" as an alias for "human";
    /// anything else is rejected.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag {
            "system" => Ok(Role::System),
            "human" | "user" => Ok(Role::Human),
            "assistant" => Ok(Role::Assistant),
            other => Err(PromptrError::InvalidRole(other.to_string())),
        }
    }

    /// The role string used on the chat-completions wire, where the
    /// human role is spelled "user"
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::Human => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::System => "system",
            Role::Human => "human",
            Role::Assistant => "assistant",
        };
        write!(f, "{}", s)
    }
}

/// A role-tagged template string, placeholders unresolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub role: Role,
    pub text: String,
}

impl MessageTemplate {
    /// Create a message template with an already-validated role
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// A message with all placeholders substituted, ready for a chat client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub role: Role,
    pub content: String,
}

impl RenderedMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a human message
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
