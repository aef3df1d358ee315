//! Chat prompt templates
//!
//! `PromptTemplate` holds an ordered sequence of role-tagged message
//! templates plus a layer of pre-bound default variables. Templates are
//! immutable: `partial` returns a new value, so one template can be shared
//! and rendered concurrently without locking.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::message::{MessageTemplate, RenderedMessage, Role};
use super::render::{render_text, scan_variables};
use crate::error::Result;

/// Mapping from placeholder name to substitution value
pub type Bindings = HashMap<String, String>;

/// Build a `Bindings` map from key-value pairs.
pub fn bindings<I, K, V>(pairs: I) -> Bindings
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// An ordered sequence of message templates with optional pre-bound
/// default variables.
///
/// Output message order always equals template order. Call-time bindings
/// override defaults on key collision; defaults act as fallbacks, not locks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    messages: Vec<MessageTemplate>,
    #[serde(default)]
    defaults: Bindings,
}

impl PromptTemplate {
    /// Build a template from `(role, text)` pairs. Role tags are validated
    /// here; placeholders are resolved lazily at render time.
    pub fn from_messages<I, R, T>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (R, T)>,
        R: AsRef<str>,
        T: Into<String>,
    {
        let mut messages = Vec::new();
        for (role, text) in entries {
            let role = Role::parse(role.as_ref())?;
            messages.push(MessageTemplate::new(role, text));
        }
        Ok(Self {
            messages,
            defaults: Bindings::new(),
        })
    }

    /// The message templates, in render order
    pub fn messages(&self) -> &[MessageTemplate] {
        &self.messages
    }

    /// The currently attached default bindings
    pub fn defaults(&self) -> &Bindings {
        &self.defaults
    }

    /// Return a new template with `layer` merged over the existing
    /// defaults. Composable: later layers win on key collision.
    pub fn partial(&self, layer: Bindings) -> Self {
        let mut defaults = self.defaults.clone();
        defaults.extend(layer);
        Self {
            messages: self.messages.clone(),
            defaults,
        }
    }

    /// Render every message in order, substituting placeholders from the
    /// defaults merged with `vars` (call-time values win).
    pub fn render(&self, vars: &Bindings) -> Result<Vec<RenderedMessage>> {
        let effective = self.effective_bindings(vars);
        self.messages
            .iter()
            .map(|m| {
                Ok(RenderedMessage {
                    role: m.role,
                    content: render_text(&m.text, &effective)?,
                })
            })
            .collect()
    }

    /// Placeholder names still unbound after the default layer, in order
    /// of first appearance across messages.
    pub fn input_variables(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for message in &self.messages {
            for name in scan_variables(&message.text)? {
                if !self.defaults.contains_key(&name) && !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    fn effective_bindings(&self, vars: &Bindings) -> Bindings {
        if self.defaults.is_empty() {
            return vars.clone();
        }
        let mut effective = self.defaults.clone();
        effective.extend(vars.clone());
        effective
    }
}
