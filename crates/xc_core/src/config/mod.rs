use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

pub const DEFAULT_DATA_DIR: &str = "data/ChinaVis2025";
pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";
pub const DEFAULT_ARK_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";
pub const DEFAULT_ARK_MODEL: &str = "doubao-seed-1-6-251015";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen:4b";

/// Runtime configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub ark_api_key: Option<String>,
    pub ark_base_url: String,
    pub ark_model: String,
    pub ark_timeout: Duration,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub ollama_timeout: Duration,
    pub top_k: usize,
    pub row_delay: Duration,
}

impl AppConfig {
    /// Load from process environment variables; a `.env` file is applied first if present.
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Ok(Self {
            data_dir: PathBuf::from(get("XC_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())),
            processed_dir: PathBuf::from(
                get("XC_PROCESSED_DIR").unwrap_or_else(|| DEFAULT_PROCESSED_DIR.to_string()),
            ),
            ark_api_key: get("ARK_API_KEY"),
            ark_base_url: get("ARK_BASE_URL").unwrap_or_else(|| DEFAULT_ARK_BASE_URL.to_string()),
            ark_model: get("ARK_ENDPOINT_ID").unwrap_or_else(|| DEFAULT_ARK_MODEL.to_string()),
            ark_timeout: Duration::from_secs(parse_num(&get, "ARK_TIMEOUT_SECS", 60)?),
            ollama_base_url: get("OLLAMA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.to_string()),
            ollama_model: get("OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            ollama_timeout: Duration::from_secs(parse_num(&get, "OLLAMA_TIMEOUT_SECS", 180)?),
            top_k: parse_num(&get, "XC_TOP_K", 5)?,
            row_delay: Duration::from_millis(parse_num(&get, "XC_ROW_DELAY_MS", 50)?),
        })
    }
}

fn parse_num<T, G>(get: &G, key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|e| {
            AppError::new("CONFIG_INVALID", format!("{key} must be a non-negative integer"))
                .with_details(format!("value={raw}; err={e}"))
        }),
    }
}
