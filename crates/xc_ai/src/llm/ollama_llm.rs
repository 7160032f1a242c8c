use std::time::Duration;

use serde::{Deserialize, Serialize};
use xc_core::error::AppError;

use super::{map_ureq_error, Llm, SamplingOptions};
use crate::ollama::OllamaClient;

pub const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Clone)]
pub struct OllamaLlm {
    client: OllamaClient,
    timeout: Duration,
}

impl OllamaLlm {
    pub fn new(client: OllamaClient) -> Self {
        Self {
            client,
            timeout: DEFAULT_GENERATE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a SamplingOptions,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

impl Llm for OllamaLlm {
    /// Returns the raw `response` text. An empty reply is not an error here;
    /// callers decide what an empty completion means.
    fn generate(&self, model: &str, prompt: &str, options: &SamplingOptions) -> Result<String, AppError> {
        let url = format!("{}/api/generate", self.client.base_url());
        let req = GenerateRequest {
            model,
            prompt,
            stream: false,
            options,
        };
        let body = serde_json::to_value(req).map_err(|e| {
            AppError::new("LLM_REQUEST_ENCODE_FAILED", "Failed to encode generate request")
                .with_details(e.to_string())
        })?;

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(body)
            .map_err(|e| map_ureq_error("Ollama generate endpoint", e))?;

        let v: GenerateResponse = resp.into_json().map_err(|e| {
            AppError::new("LLM_RESPONSE_MALFORMED", "Failed to decode generate response")
                .with_details(e.to_string())
        })?;
        Ok(v.response)
    }
}
