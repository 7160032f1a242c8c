use std::time::Duration;

use serde::{Deserialize, Serialize};
use xc_core::error::AppError;

use super::{map_ureq_error, ChatLlm, ChatMessage};

/// OpenAI-compatible chat completions client (Volcengine Ark).
#[derive(Debug, Clone)]
pub struct ArkChatClient {
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl ArkChatClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
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

impl ChatLlm for ArkChatClient {
    fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::new("LLM_AUTH_FAILED", "ARK_API_KEY is not configured"))?;

        let url = format!("{}/chat/completions", self.base_url);
        let body = serde_json::to_value(ChatCompletionRequest { model, messages }).map_err(|e| {
            AppError::new("LLM_REQUEST_ENCODE_FAILED", "Failed to encode chat request")
                .with_details(e.to_string())
        })?;

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .set("Authorization", &format!("Bearer {api_key}"))
            .send_json(body)
            .map_err(|e| map_ureq_error("chat completions endpoint", e))?;

        let parsed: ChatCompletionResponse = resp.into_json().map_err(|e| {
            AppError::new("LLM_RESPONSE_MALFORMED", "Failed to decode chat response")
                .with_details(e.to_string())
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                AppError::new("LLM_RESPONSE_MALFORMED", "Chat response carried no message content")
            })
    }
}
