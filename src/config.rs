//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};

/// Runtime configuration. The LLM key is optional: without it every tool
/// runs in rule-based fallback mode.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key. `None` disables the LLM path entirely.
    pub openai_api_key: Option<String>,
    /// Chat model used for all generation calls.
    pub openai_model: String,
    /// Upper bound on a single generation call, in seconds.
    pub llm_timeout_secs: u64,
    /// HTTP listen port (secondary interface).
    pub port: u16,
    /// Default log filter when RUST_LOG is unset.
    pub rust_log: String,
}

impl Config {
    /// Load configuration from the environment, reading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .and_then(reject_placeholder),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Empty and sample keys count as unconfigured.
fn reject_placeholder(key: String) -> Option<String> {
    let trimmed = key.trim();
    if trimmed.is_empty() || trimmed == "example_key" {
        None
    } else {
        Some(key)
    }
}
