use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::Dataset;
use crate::error::AppError;

mod csv_table;

pub use csv_table::parse_csv_dataset;

/// Where datasets come from. The file format behind it is the source's concern.
pub trait DatasetSource: Send + Sync {
    /// Names of all datasets this source can serve.
    fn list_datasets(&self) -> Result<Vec<String>, AppError>;

    /// `Ok(None)` means the dataset does not exist; errors mean it exists but is unreadable.
    fn read_dataset(&self, name: &str) -> Result<Option<Dataset>, AppError>;

    /// Like `read_dataset`, but an absent dataset is `DATASET_NOT_FOUND`.
    fn require_dataset(&self, name: &str) -> Result<Dataset, AppError> {
        self.read_dataset(name)?.ok_or_else(|| {
            AppError::new("DATASET_NOT_FOUND", "Dataset not found")
                .with_details(format!("dataset={name}"))
        })
    }
}

/// Directory of `<name>.csv` spreadsheet exports.
#[derive(Debug, Clone)]
pub struct CsvDirSource {
    root: PathBuf,
}

impl CsvDirSource {
    pub fn open(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    fn dataset_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.csv"))
    }
}

impl DatasetSource for CsvDirSource {
    fn list_datasets(&self) -> Result<Vec<String>, AppError> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            AppError::new("DATASET_DIR_UNREADABLE", "Failed to list data directory")
                .with_details(format!("path={}; err={}", self.root.display(), e))
        })?;

        let mut names = Vec::new();
        for ent in entries.flatten() {
            let path = ent.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|s| s.to_str()) != Some("csv") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_dataset(&self, name: &str) -> Result<Option<Dataset>, AppError> {
        let path = self.dataset_path(name);
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path).map_err(|e| {
            AppError::new("DATASET_READ_FAILED", "Failed to read dataset file")
                .with_details(format!("path={}; err={}", path.display(), e))
        })?;
        let dataset = parse_csv_dataset(name, &text)?;
        tracing::debug!(dataset = %name, rows = dataset.rows.len(), "dataset parsed");
        Ok(Some(dataset))
    }
}
