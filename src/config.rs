use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use promptr::OpenAiConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let defaults = OpenAiConfig::default();
        Self {
            model: defaults.model,
            base_url: defaults.base_url,
            api_key_env: defaults.api_key_env,
            temperature: defaults.temperature,
            max_tokens: defaults.max_tokens,
            timeout_ms: defaults.timeout.as_millis() as u64,
        }
    }
}

impl Config {
    /// Load config from an explicit path, or from the default location.
    /// A missing file at the default location falls back to defaults; an
    /// explicit path that cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Default config location: `<config_dir>/promptr/config.yml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("promptr")
            .join("config.yml")
    }

    /// Log filter applied when RUST_LOG is unset
    pub fn log_filter(&self) -> &str {
        self.log_level.as_deref().unwrap_or("info")
    }

    /// Translate the llm section into a client config
    pub fn to_openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            model: self.llm.model.clone(),
            base_url: self.llm.base_url.clone(),
            api_key_env: self.llm.api_key_env.clone(),
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
            timeout: Duration::from_millis(self.llm.timeout_ms),
        }
    }
}
