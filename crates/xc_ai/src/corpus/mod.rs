//! Retrieval corpus: core datasets flattened into tagged text records.
//!
//! The cache is filled once, on the first `load`, and never reloaded.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use xc_core::dataset::DatasetSource;
use xc_core::domain::Row;

/// Datasets used for question answering.
pub const CORPUS_DATASETS: &[&str] = &[
    "07建制沿革 - 总数据和各朝代数据",
    "17事件 - 总数据和各朝代数据",
    "19人物 - 总数据和各朝代数据",
    "15物产 - 总数据和各朝代数据",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub source: String,
    pub text: String,
}

impl CorpusRecord {
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    /// `[source:<name>] col:val; col:val`, present values only.
    pub fn from_row(source: &str, row: &Row) -> Self {
        let pairs = row
            .iter()
            .filter(|(_, v)| v.is_present())
            .map(|(k, v)| format!("{k}:{v}"))
            .collect::<Vec<_>>();
        Self {
            source: source.to_string(),
            text: format!("[source:{source}] {}", pairs.join("; ")),
        }
    }
}

pub struct CorpusCache {
    source: Box<dyn DatasetSource>,
    datasets: Vec<String>,
    records: OnceLock<Vec<CorpusRecord>>,
}

impl CorpusCache {
    pub fn new(source: Box<dyn DatasetSource>) -> Self {
        Self::with_datasets(source, CORPUS_DATASETS.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_datasets(source: Box<dyn DatasetSource>, datasets: Vec<String>) -> Self {
        Self {
            source,
            datasets,
            records: OnceLock::new(),
        }
    }

    /// Concurrent first callers block on a single initializer.
    pub fn load(&self) -> &[CorpusRecord] {
        self.records.get_or_init(|| self.read_all()).as_slice()
    }

    pub fn is_loaded(&self) -> bool {
        self.records.get().is_some()
    }

    /// Record count; loads the corpus if needed.
    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.load().is_empty()
    }

    pub fn datasets(&self) -> &[String] {
        &self.datasets
    }

    fn read_all(&self) -> Vec<CorpusRecord> {
        tracing::info!(datasets = self.datasets.len(), "loading retrieval corpus");
        let mut out = Vec::new();
        for name in self.datasets.iter() {
            match self.source.read_dataset(name) {
                Ok(Some(ds)) => {
                    let before = out.len();
                    out.extend(ds.rows.iter().map(|row| CorpusRecord::from_row(name, row)));
                    tracing::debug!(dataset = %name, records = out.len() - before, "corpus dataset loaded");
                }
                Ok(None) => {
                    tracing::info!(dataset = %name, "corpus dataset not found; skipping");
                }
                Err(e) => {
                    tracing::warn!(dataset = %name, code = %e.code, error = %e.detail_line(), "failed to load corpus dataset");
                }
            }
        }
        tracing::info!(records = out.len(), "retrieval corpus loaded");
        out
    }
}
