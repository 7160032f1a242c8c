use serde_json::{json, Map, Value};
use xc_core::domain::{is_placeholder_column, Row};
use xc_core::error::AppError;

use crate::llm::{Llm, SamplingOptions};

mod prompts;
pub mod schema;

use prompts::extraction_prompt;
pub use schema::{matching_categories, select_schema, ExtractionSchema, FieldSpec, SchemaCategory};

pub const MALFORMED_OUTPUT_MARKER: &str = "non-JSON output";
pub const REQUEST_FAILED_MARKER: &str = "request failed";

/// Terminal state of one row's extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// No usable text in the row; the LLM was not called.
    NoText,
    Parsed(Map<String, Value>),
    /// The LLM answered, but not with a JSON object.
    Malformed { original_text: String },
    RequestFailed(AppError),
}

impl RowOutcome {
    /// Value stored under the row's `llm_processed` attribute; `None` leaves the row untouched.
    pub fn to_llm_processed(&self) -> Option<Value> {
        match self {
            RowOutcome::NoText => None,
            RowOutcome::Parsed(map) => Some(Value::Object(map.clone())),
            RowOutcome::Malformed { original_text } => Some(json!({
                "original_text": original_text,
                "error": MALFORMED_OUTPUT_MARKER,
            })),
            RowOutcome::RequestFailed(e) => Some(json!({
                "error": REQUEST_FAILED_MARKER,
                "code": e.code,
            })),
        }
    }
}

/// `key: value` lines for every non-blank text column with a real header.
pub fn build_context(row: &Row) -> Option<String> {
    let lines = row
        .iter()
        .filter(|(k, _)| !is_placeholder_column(k))
        .filter_map(|(k, v)| {
            let text = v.as_text()?.trim();
            if text.is_empty() {
                return None;
            }
            Some(format!("{}: {}", k.trim(), text))
        })
        .collect::<Vec<_>>();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

pub fn build_extraction_prompt(schema: &ExtractionSchema, dataset_name: &str, context: &str) -> String {
    extraction_prompt(schema, dataset_name, context)
}

/// Interpret raw completion text, tolerating a ```json fence.
pub fn parse_llm_output(raw: &str, context: &str) -> RowOutcome {
    let mut body = raw.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => RowOutcome::Parsed(map),
        Ok(other) => {
            tracing::warn!(kind = json_kind(&other), "LLM returned JSON that is not an object");
            RowOutcome::Malformed {
                original_text: context.to_string(),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, raw_output = %raw, "LLM did not return valid JSON");
            RowOutcome::Malformed {
                original_text: context.to_string(),
            }
        }
    }
}

/// Extract one row. Exactly one LLM call when the row has text, none otherwise; no retries.
pub fn extract_row(llm: &dyn Llm, model: &str, row: &Row, dataset_name: &str) -> RowOutcome {
    let Some(context) = build_context(row) else {
        return RowOutcome::NoText;
    };

    let schema = select_schema(dataset_name);
    let prompt = build_extraction_prompt(&schema, dataset_name, &context);

    match llm.generate(model, &prompt, &SamplingOptions::deterministic()) {
        Ok(raw) => parse_llm_output(&raw, &context),
        Err(e) => {
            tracing::warn!(dataset = %dataset_name, code = %e.code, error = %e.detail_line(), "extraction request failed");
            RowOutcome::RequestFailed(e)
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
