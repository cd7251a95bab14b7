//! Chat-completion client for the reviewer backend
//!
//! Talks to an OpenAI-compatible chat-completions endpoint (Groq by
//! default). Uses ureq (sync HTTP) — no async runtime needed.

use crate::ai::reasoner::SuggestionProvider;
use crate::ai::{prompts, AiError, AiResult};
use crate::analyzers::ReportStats;
use crate::models::Finding;
use serde::{Deserialize, Serialize};
use std::env;

/// Default chat-completions endpoint (Groq, OpenAI-compatible).
pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default reviewer model.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            temperature: 0.2,
        }
    }
}

/// Reviewer LLM client — sync HTTP via ureq (no tokio needed)
pub struct ChatClient {
    config: ChatConfig,
    api_key: String,
    agent: ureq::Agent,
}

fn make_agent() -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // We handle status codes ourselves
        .timeout_global(Some(std::time::Duration::from_secs(120))) // LLM calls can be slow
        .build()
        .new_agent()
}

impl ChatClient {
    pub fn new(config: ChatConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            api_key: api_key.into(),
            agent: make_agent(),
        }
    }

    /// Build a client from `DEVMATE_API_KEY` / `GROQ_API_KEY`.
    pub fn from_env(config: ChatConfig) -> AiResult<Self> {
        let api_key = env::var("DEVMATE_API_KEY")
            .or_else(|_| env::var("GROQ_API_KEY"))
            .map_err(|_| AiError::MissingApiKey {
                env_var: "GROQ_API_KEY".to_string(),
            })?;
        Ok(Self::new(config, api_key))
    }

    /// Whether any API key is configured in the environment.
    pub fn key_available() -> bool {
        env::var("DEVMATE_API_KEY").is_ok() || env::var("GROQ_API_KEY").is_ok()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Generate a response (sync)
    pub fn generate(&self, mut messages: Vec<Message>, system: Option<&str>) -> AiResult<String> {
        if let Some(sys) = system {
            messages.insert(0, Message::system(sys));
        }

        let body = ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .agent
            .post(&self.config.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body)
            .map_err(|e| AiError::ApiError {
                status: 0,
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let error_text = response.into_body().read_to_string().unwrap_or_default();
            return Err(AiError::ApiError {
                status,
                message: error_text,
            });
        }

        let resp: ChatResponse = response
            .into_body()
            .read_json()
            .map_err(|e| AiError::ParseError(e.to_string()))?;

        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AiError::ParseError("No response choices".to_string()))
    }
}

impl SuggestionProvider for ChatClient {
    fn suggest(&self, finding: &Finding) -> AiResult<String> {
        let prompt = prompts::finding_prompt(finding);
        self.generate(vec![Message::user(prompt)], Some(prompts::SYSTEM_PROMPT))
            .map(|text| text.trim().to_string())
    }

    fn summarize(&self, repository: &str, stats: &ReportStats) -> AiResult<String> {
        let prompt = prompts::summary_prompt(repository, stats);
        self.generate(vec![Message::user(prompt)], Some(prompts::SYSTEM_PROMPT))
            .map(|text| text.trim().to_string())
    }
}

// Chat-completions wire types
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.temperature, 0.2);
        assert!(config.api_url.contains("chat/completions"));
    }

    #[test]
    fn test_message_constructors() {
        let msg = Message::user("hello");
        assert_eq!(msg.role, Role::User);
        let msg = Message::system("rules");
        assert_eq!(msg.role, Role::System);
    }
}
