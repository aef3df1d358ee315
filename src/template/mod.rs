//! Prompt Templates - role-tagged message templates with placeholder
//! substitution and partial application
//!
//! This module provides:
//! - Role-tagged message types
//! - The `{name}` placeholder scanner
//! - `PromptTemplate` with persistent partial binding

mod message;
mod prompt;
mod render;

pub use message::{MessageTemplate, RenderedMessage, Role};
pub use prompt::{Bindings, PromptTemplate, bindings};
pub use render::{render_text, scan_variables};
