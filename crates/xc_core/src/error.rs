use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured error shared by the core, the AI layer and the CLI.
///
/// `code` is a stable SCREAMING_SNAKE reason code; callers branch on it
/// instead of on message text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// One-line rendering including details, for envelopes and log fields.
    pub fn detail_line(&self) -> String {
        match self.details.as_deref() {
            Some(d) if !d.is_empty() => format!("{self}: {d}"),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
