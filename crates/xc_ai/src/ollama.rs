use std::time::Duration;

use xc_core::error::AppError;

const LOCAL_PREFIX: &str = "http://127.0.0.1";

/// Base URL handle for a local Ollama daemon.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
}

impl OllamaClient {
    /// Create a client for Ollama. This is strictly limited to `127.0.0.1`.
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        if !is_local_base_url(&base_url) {
            return Err(AppError::new(
                "AI_REMOTE_NOT_ALLOWED",
                "Ollama base URL must be localhost (127.0.0.1)",
            )
            .with_details(format!("base_url={base_url}")));
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn health_check(&self) -> Result<(), AppError> {
        let url = format!("{}/api/tags", self.base_url);
        let resp = ureq::get(&url).timeout(Duration::from_millis(800)).call();

        match resp {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, _)) => Err(AppError::new(
                "AI_OLLAMA_UNHEALTHY",
                "Ollama health check failed",
            )
            .with_details(format!("status={status}"))),
            Err(e) => Err(AppError::new(
                "AI_OLLAMA_UNREACHABLE",
                "Failed to reach Ollama on 127.0.0.1",
            )
            .with_details(e.to_string())
            .with_retryable(true)),
        }
    }

    /// Health check that only logs. Returns whether the daemon answered.
    pub fn is_healthy(&self) -> bool {
        match self.health_check() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    base_url = %self.base_url,
                    code = %e.code,
                    error = %e.detail_line(),
                    "Ollama health check failed; continuing"
                );
                false
            }
        }
    }
}

fn is_local_base_url(base_url: &str) -> bool {
    let Some(rest) = base_url.strip_prefix(LOCAL_PREFIX) else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    let Some(port) = rest.strip_prefix(':') else {
        return false;
    };
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    matches!(port.parse::<u16>(), Ok(p) if p > 0)
}
