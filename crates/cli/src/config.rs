use proto::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variables consulted for the API key, in priority order.
const API_KEY_ENVS: &[&str] = &["TOOLGATE_API_KEY", "DEEPSEEK_API_KEY", "OPENAI_API_KEY"];

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub agent: AgentConfig,
}

/// LLM endpoint configuration.
///
/// Defaults target DeepSeek's OpenAI-compatible endpoint; any endpoint
/// speaking the chat-completions protocol works.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key; usually supplied via environment instead of the file.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible endpoint.
    pub base_url: Option<String>,
    /// Target model id.
    pub model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: Some("https://api.deepseek.com/v1".to_string()),
            model: "deepseek-chat".to_string(),
        }
    }
}

/// Agent and supervisor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// SQLite database path for session transcripts.
    pub db_path: String,
    /// Bound on consecutive implicit resumes in one turn.
    pub max_auto_approvals: usize,
    /// Explicit auto-approve tool names. When absent the set is derived
    /// from each tool's own confirmation flag.
    pub auto_approve: Option<Vec<String>>,
    /// Override of the engine's system prompt.
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            db_path: "~/.toolgate/memory.db".to_string(),
            max_auto_approvals: proto::approval::DEFAULT_MAX_AUTO_APPROVALS,
            auto_approve: None,
            system_prompt: None,
        }
    }
}

impl Config {
    /// Loads configuration from the given path, the default location, or
    /// built-in defaults when no file exists. Environment variables then
    /// override the API key.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);
        let mut config = if path.exists() {
            debug!("Loading config from {}", path.display());
            let raw = std::fs::read_to_string(&path)?;
            toml::from_str(&raw).map_err(|e| ConfigError::Toml(e.to_string()))?
        } else {
            debug!("No config file at {}; using defaults", path.display());
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Applies environment-variable overrides for the API key.
    pub fn apply_env(&mut self) {
        for name in API_KEY_ENVS {
            if let Ok(key) = std::env::var(name)
                && !key.trim().is_empty()
            {
                self.llm.api_key = key;
                break;
            }
        }
    }

    /// Returns the API key or a missing-field error.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        let key = self.llm.api_key.trim();
        if key.is_empty() {
            return Err(ConfigError::MissingField("llm.api_key".to_string()));
        }
        Ok(key)
    }
}

fn default_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".toolgate").join("config.toml")
}
