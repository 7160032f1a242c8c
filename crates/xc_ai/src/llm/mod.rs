use serde::{Deserialize, Serialize};
use xc_core::error::AppError;

pub mod ark_chat;
pub mod ollama_llm;

pub use ark_chat::ArkChatClient;
pub use ollama_llm::OllamaLlm;

/// Sampling knobs forwarded to a completion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub top_p: f32,
}

impl SamplingOptions {
    /// Zero temperature with constrained nucleus sampling, for schema extraction.
    pub fn deterministic() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.9,
        }
    }
}

/// Single-prompt completion endpoint.
pub trait Llm {
    fn generate(&self, model: &str, prompt: &str, options: &SamplingOptions) -> Result<String, AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Chat completion endpoint taking an ordered message list.
pub trait ChatLlm {
    fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, AppError>;
}

/// Map a `ureq` failure onto the shared reason codes.
pub(crate) fn map_ureq_error(endpoint: &str, err: ureq::Error) -> AppError {
    match err {
        ureq::Error::Status(status, resp) => {
            let body = resp.into_string().unwrap_or_default();
            let code = if status == 401 || status == 403 {
                "LLM_AUTH_FAILED"
            } else {
                "LLM_HTTP_STATUS"
            };
            AppError::new(code, format!("{endpoint} returned an error status"))
                .with_details(format!("status={status}; body={}", truncate_chars(&body, 300)))
                .with_retryable(status >= 500)
        }
        ureq::Error::Transport(t) => {
            AppError::new("LLM_REQUEST_FAILED", format!("Failed to call {endpoint}"))
                .with_details(t.to_string())
                .with_retryable(true)
        }
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
