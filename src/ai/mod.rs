//! LLM-backed finding explanation
//!
//! This module provides the budgeted reasoning pass that turns analyzer
//! findings into human-readable suggestions. Uses BYOK (bring your own key)
//! model - the API key is read from environment variables.
//!
//! # Environment Variables
//!
//! - `GROQ_API_KEY`: API key for the default Groq backend
//! - `DEVMATE_API_KEY`: overrides `GROQ_API_KEY` when both are set

mod client;
mod prompts;
mod reasoner;

pub use client::{ChatClient, ChatConfig, Message, Role, DEFAULT_API_URL, DEFAULT_MODEL};
pub use prompts::{finding_prompt, summary_prompt, SYSTEM_PROMPT};
pub use reasoner::{FindingReasoner, RetryPolicy, RuleBasedSuggester, SuggestionProvider};

use thiserror::Error;

/// Errors that can occur in the AI module
#[derive(Error, Debug)]
pub enum AiError {
    #[error("Missing API key: {env_var} not set")]
    MissingApiKey { env_var: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl AiError {
    /// Whether the error looks like a rate/quota limit and is worth
    /// retrying with backoff. Classification inspects the error text for
    /// the substrings "rate" or "quota".
    pub fn is_rate_limited(&self) -> bool {
        let text = self.to_string().to_lowercase();
        text.contains("rate") || text.contains("quota")
    }
}

pub type AiResult<T> = Result<T, AiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_classification() {
        let err = AiError::ApiError {
            status: 429,
            message: "Rate limit reached for model".into(),
        };
        assert!(err.is_rate_limited());

        let err = AiError::ApiError {
            status: 402,
            message: "quota exceeded".into(),
        };
        assert!(err.is_rate_limited());

        let err = AiError::ApiError {
            status: 500,
            message: "internal server error".into(),
        };
        assert!(!err.is_rate_limited());

        let err = AiError::ParseError("No response choices".into());
        assert!(!err.is_rate_limited());
    }
}
