//! Offline batch: every row of every selected dataset goes through the
//! row extractor, strictly one after another, and the augmented rows are
//! written to `<output_dir>/<dataset>.json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use xc_core::dataset::DatasetSource;
use xc_core::domain::Row;
use xc_core::error::AppError;

use crate::extract::{extract_row, matching_categories, select_schema, RowOutcome, SchemaCategory};
use crate::llm::Llm;

pub const LLM_PROCESSED_KEY: &str = "llm_processed";
/// Used when a source column already occupies `llm_processed`.
pub const LLM_PROCESSED_FALLBACK_KEY: &str = "_llm_processed";

pub const DEFAULT_ROW_DELAY: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetReport {
    pub dataset: String,
    pub category: SchemaCategory,
    pub rows: usize,
    pub parsed: usize,
    pub malformed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub output_path: Option<String>,
    pub written: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFailure {
    pub dataset: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub started_at: String,
    pub finished_at: String,
    pub datasets: Vec<DatasetReport>,
    pub failures: Vec<DatasetFailure>,
}

pub struct BatchPipeline<'a> {
    source: &'a dyn DatasetSource,
    llm: &'a dyn Llm,
    model: String,
    output_dir: PathBuf,
    row_delay: Duration,
}

impl<'a> BatchPipeline<'a> {
    pub fn new(
        source: &'a dyn DatasetSource,
        llm: &'a dyn Llm,
        model: impl Into<String>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            source,
            llm,
            model: model.into(),
            output_dir,
            row_delay: DEFAULT_ROW_DELAY,
        }
    }

    pub fn with_row_delay(mut self, row_delay: Duration) -> Self {
        self.row_delay = row_delay;
        self
    }

    pub fn output_path(&self, dataset: &str) -> PathBuf {
        self.output_dir.join(format!("{dataset}.json"))
    }

    /// Explicit names win; otherwise every dataset the source lists.
    pub fn resolve_datasets(&self, explicit: &[String]) -> Result<Vec<String>, AppError> {
        let names = if explicit.is_empty() {
            self.source.list_datasets()?
        } else {
            explicit.to_vec()
        };
        if names.is_empty() {
            return Err(AppError::new(
                "PIPELINE_NO_DATASETS",
                "No datasets to process",
            ));
        }
        Ok(names)
    }

    pub fn process_dataset(&self, name: &str) -> Result<DatasetReport, AppError> {
        let dataset = self.source.require_dataset(name)?;

        let schema = select_schema(name);
        let matches = matching_categories(name);
        if matches.len() > 1 {
            tracing::warn!(
                dataset = %name,
                matches = ?matches,
                selected = ?schema.category,
                "dataset name matches several schema markers; using the first"
            );
        }

        let mut report = DatasetReport {
            dataset: name.to_string(),
            category: schema.category,
            rows: dataset.rows.len(),
            parsed: 0,
            malformed: 0,
            failed: 0,
            skipped: 0,
            output_path: None,
            written: false,
        };

        if dataset.rows.is_empty() {
            tracing::warn!(dataset = %name, "dataset has no rows; nothing written");
            return Ok(report);
        }

        tracing::info!(dataset = %name, rows = report.rows, category = ?schema.category, "processing dataset");

        let mut out: Vec<Value> = Vec::with_capacity(dataset.rows.len());
        for (idx, row) in dataset.rows.iter().enumerate() {
            if idx > 0 && !self.row_delay.is_zero() {
                thread::sleep(self.row_delay);
            }

            let outcome = extract_row(self.llm, &self.model, row, name);
            match &outcome {
                RowOutcome::NoText => report.skipped += 1,
                RowOutcome::Parsed(_) => report.parsed += 1,
                RowOutcome::Malformed { .. } => report.malformed += 1,
                RowOutcome::RequestFailed(_) => report.failed += 1,
            }
            tracing::debug!(dataset = %name, row = idx + 1, total = report.rows, "row processed");

            out.push(Value::Object(merge_outcome(row, &outcome)));
        }

        let path = self.output_path(name);
        write_json_atomic(&path, &Value::Array(out))?;
        tracing::info!(
            dataset = %name,
            path = %path.display(),
            parsed = report.parsed,
            malformed = report.malformed,
            failed = report.failed,
            skipped = report.skipped,
            "dataset written"
        );

        report.output_path = Some(path.to_string_lossy().to_string());
        report.written = true;
        Ok(report)
    }

    /// Process every resolved dataset. A failing dataset is recorded and skipped.
    pub fn run(&self, explicit: &[String]) -> Result<BatchSummary, AppError> {
        let started_at = now_rfc3339_utc()?;
        let names = self.resolve_datasets(explicit)?;
        tracing::info!(datasets = names.len(), "batch started");

        let mut datasets = Vec::new();
        let mut failures = Vec::new();
        for name in names.iter() {
            match self.process_dataset(name) {
                Ok(report) => datasets.push(report),
                Err(e) => {
                    tracing::warn!(dataset = %name, code = %e.code, error = %e.detail_line(), "dataset failed");
                    failures.push(DatasetFailure {
                        dataset: name.clone(),
                        code: e.code.clone(),
                        message: e.detail_line(),
                    });
                }
            }
        }

        Ok(BatchSummary {
            started_at,
            finished_at: now_rfc3339_utc()?,
            datasets,
            failures,
        })
    }
}

/// Original row fields plus the outcome under `llm_processed`. Source fields are never replaced.
pub fn merge_outcome(row: &Row, outcome: &RowOutcome) -> Map<String, Value> {
    let mut obj = row.to_json_object();
    let Some(processed) = outcome.to_llm_processed() else {
        return obj;
    };

    let free_key = [LLM_PROCESSED_KEY, LLM_PROCESSED_FALLBACK_KEY]
        .into_iter()
        .find(|k| !obj.contains_key(*k));
    match free_key {
        Some(key) => {
            obj.insert(key.to_string(), processed);
        }
        None => {
            tracing::warn!("row already has both llm_processed columns; outcome dropped");
        }
    }
    obj
}

fn write_json_atomic(path: &Path, value: &Value) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::new("PIPELINE_WRITE_FAILED", "Failed to create output directory")
                .with_details(format!("path={}; err={}", parent.display(), e))
        })?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(value).map_err(|e| {
        AppError::new("PIPELINE_WRITE_FAILED", "Failed to encode processed rows")
            .with_details(e.to_string())
    })?;
    fs::write(&tmp, json.as_bytes()).map_err(|e| {
        AppError::new("PIPELINE_WRITE_FAILED", "Failed to write processed rows")
            .with_details(format!("path={}; err={}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        AppError::new("PIPELINE_WRITE_FAILED", "Failed to finalize processed rows write")
            .with_details(format!("tmp={}; dest={}; err={}", tmp.display(), path.display(), e))
    })?;
    Ok(())
}

fn now_rfc3339_utc() -> Result<String, AppError> {
    OffsetDateTime::now_utc().format(&Rfc3339).map_err(|e| {
        AppError::new("PIPELINE_TIME_FAILED", "Failed to format time").with_details(e.to_string())
    })
}
