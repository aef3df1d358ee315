//! OpenAI-compatible chat-completions client
//!
//! Speaks the `/chat/completions` wire format, which hosted endpoints such
//! as Doubao and Bailian expose behind custom base URLs. Non-streaming
//! calls POST once and parse the body; streaming calls consume Server-Sent
//! Events (`data: {...}` lines terminated by `data: [DONE]`) and forward
//! each text delta as a `StreamChunk`.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, warn};
use reqwest::Client;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::{Value, json};
use tokio::sync::mpsc;

use super::client::{ChatClient, ChatResponse, TokenUsage};
use super::streaming::StreamChunk;
use crate::error::{PromptrError, Result};
use crate::template::RenderedMessage;

/// Default base URL (override for OpenAI-compatible hosts)
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default environment variable holding the API key
const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for the OpenAI-compatible client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            temperature: 0.7,
            max_tokens: None,
            timeout: Duration::from_secs(300),
        }
    }
}

impl OpenAiConfig {
    /// Create a new config with a specific model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Override the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// OpenAI-compatible API client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new client, reading the API key from the environment
    /// variable named in the config
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let api_key =
            std::env::var(&config.api_key_env).map_err(|_| PromptrError::MissingApiKey {
                env_var: config.api_key_env.clone(),
            })?;
        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: String, config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// The configured model name
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Build the request body for the chat-completions API
    fn build_request(&self, messages: &[RenderedMessage], stream: bool) -> Value {
        let messages: Vec<Value> = messages
            .iter()
            .map(|m| {
                json!({
                    "role": m.role.as_wire_str(),
                    "content": m.content,
                })
            })
            .collect();

        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
            "temperature": self.config.temperature,
        });

        if let Some(max_tokens) = self.config.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if stream {
            body["stream"] = json!(true);
        }

        body
    }

    /// Parse a non-streaming API response
    fn parse_response(&self, body: Value) -> Result<ChatResponse> {
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                PromptrError::Api {
                    status: 200,
                    message: "response has no choices[0].message.content".to_string(),
                }
            })?
            .to_string();

        let usage = body
            .get("usage")
            .map(|u| {
                TokenUsage::new(
                    u["prompt_tokens"].as_u64().unwrap_or(0),
                    u["completion_tokens"].as_u64().unwrap_or(0),
                )
            })
            .unwrap_or_default();

        Ok(ChatResponse { content, usage })
    }

    /// Extract the text delta from one SSE data payload, if any
    fn parse_stream_data(data: &str) -> Option<String> {
        if data.is_empty() || data == "[DONE]" {
            return None;
        }
        let value: Value = serde_json::from_str(data).ok()?;
        value["choices"][0]["delta"]["content"]
            .as_str()
            .map(str::to_string)
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn invoke(&self, messages: &[RenderedMessage]) -> Result<ChatResponse> {
        let body = self.build_request(messages, false);
        debug!("POST {} model={}", self.endpoint(), self.config.model);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(PromptrError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        self.parse_response(body)
    }

    async fn stream(
        &self,
        messages: &[RenderedMessage],
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<()> {
        let body = self.build_request(messages, true);
        debug!("POST {} (stream) model={}", self.endpoint(), self.config.model);

        let mut source = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .eventsource()
            .map_err(|e| PromptrError::EventSource(e.to_string()))?;

        while let Some(event) = source.next().await {
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(message)) => {
                    if message.data == "[DONE]" {
                        let _ = chunk_tx.send(StreamChunk::Done).await;
                        break;
                    }
                    if let Some(delta) = Self::parse_stream_data(&message.data)
                        && chunk_tx.send(StreamChunk::Text(delta)).await.is_err()
                    {
                        // Receiver dropped: consumer cancelled
                        break;
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    // Server closed without [DONE]; treat as completion
                    let _ = chunk_tx.send(StreamChunk::Done).await;
                    break;
                }
                Err(err) => {
                    warn!("stream error: {}", err);
                    let _ = chunk_tx.send(StreamChunk::Error(err.to_string())).await;
                    break;
                }
            }
        }

        source.close();
        Ok(())
    }
}

// Debug must not leak the API key
impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
