//! LLM text generation collaborator.
//!
//! The single point of network access in the crate. Optimizers hold an
//! `Option<Arc<dyn TextGenerator>>`; when it is `None` or a call fails they
//! fall back to rule-based rewrites, so nothing here is load-bearing for a
//! request to succeed.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Failure modes of a generation attempt. All of them are recovered by the
/// optimizer's fallback path.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The bounded request timeout elapsed.
    #[error("generation timed out")]
    Timeout,

    /// The model returned no usable text.
    #[error("LLM returned empty content")]
    EmptyContent,
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Http(err)
        }
    }
}

/// A single generation request: fixed system instructions plus the user
/// content built from the profile field and target role.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// System instructions for the model.
    pub system: String,
    /// User content embedding the profile field and target role.
    pub user: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Create a generation request.
    pub fn new(system: impl Into<String>, user: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens,
        }
    }
}

/// Injected text-generation capability.
///
/// One operation, one failure kind; substitute a deterministic stub in tests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt. A single best-effort attempt; callers
    /// fall back deterministically on any error.
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// OpenAI chat-completions backed generator.
pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    /// Build a generator with a bounded request timeout.
    pub fn new(
        api_key: String,
        model: String,
        timeout: std::time::Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let body = ChatRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
        };

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerationError::EmptyContent);
        }

        debug!(model = %self.model, "generation succeeded");
        Ok(text)
    }
}

/// Split model output into (text, explanation) on the `EXPLANATION:` marker.
///
/// The prompts instruct the model to end with an `EXPLANATION:` line; models
/// that ignore the format yield `None` for the explanation and the caller
/// substitutes a canned one.
pub fn split_explanation(raw: &str) -> (String, Option<String>) {
    match raw.split_once("EXPLANATION:") {
        Some((text, explanation)) => (
            text.trim().trim_matches('"').to_string(),
            Some(explanation.trim().to_string()),
        ),
        None => (raw.trim().to_string(), None),
    }
}
